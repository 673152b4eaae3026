#![forbid(unsafe_code)]

//! Property tests for ANSI-to-markup conversion.
//!
//! 1. Text without escapes renders exactly as `escape_markup` would.
//! 2. Output never contains an escape byte or an unescaped `<` outside the
//!    styler's own span tags.
//! 3. Every render closes the spans it opens.
//! 4. After `reset`, a render matches a fresh styler.
//!
//! Run:
//!   cargo test -p outpane-text --test proptest_markup_invariants

use outpane_text::{AnsiMarkup, Palette, TextStyler, escape_markup};
use proptest::prelude::*;

fn sgr() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u8..110).prop_map(|n| format!("\x1b[{n}m")),
        (0u8..=255).prop_map(|n| format!("\x1b[38;5;{n}m")),
        (0u8..=255, 0u8..=255, 0u8..=255).prop_map(|(r, g, b)| format!("\x1b[48;2;{r};{g};{b}m")),
        Just("\x1b[2K".to_string()),
        Just("\x1b]0;title\x07".to_string()),
    ]
}

fn chunk() -> impl Strategy<Value = String> {
    prop_oneof!["[a-zA-Z0-9 <>&\"']{0,12}", sgr()]
}

fn ansi_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(chunk(), 0..8).prop_map(|parts| parts.concat())
}

fn strip_spans(markup: &str) -> String {
    let mut out = String::new();
    let mut rest = markup;
    while let Some(start) = rest.find("<span style=\"") {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        let end = after.find("\">").map_or(after.len(), |i| i + 2);
        rest = &after[end..];
    }
    out.push_str(rest);
    out.replace("</span>", "")
}

proptest! {
    #[test]
    fn plain_text_is_just_escaped(text in "[a-zA-Z0-9 <>&\"'\t\n]{0,40}") {
        let mut styler = AnsiMarkup::new(Palette::neutral());
        prop_assert_eq!(styler.render(&text), escape_markup(&text));
    }

    #[test]
    fn output_is_safe_markup(text in ansi_text()) {
        let mut styler = AnsiMarkup::new(Palette::neutral());
        let markup = styler.render(&text);
        prop_assert!(!markup.contains('\x1b'));
        let bare = strip_spans(&markup);
        prop_assert!(!bare.contains('<'));
        prop_assert!(!bare.contains('>'));
    }

    #[test]
    fn spans_are_balanced(first in ansi_text(), second in ansi_text()) {
        let mut styler = AnsiMarkup::new(Palette::alert());
        for text in [first, second] {
            let markup = styler.render(&text);
            prop_assert_eq!(
                markup.matches("<span").count(),
                markup.matches("</span>").count()
            );
        }
    }

    #[test]
    fn reset_matches_fresh_styler(prefix in ansi_text(), text in ansi_text()) {
        let mut used = AnsiMarkup::new(Palette::neutral());
        used.render(&prefix);
        used.reset();
        let mut fresh = AnsiMarkup::new(Palette::neutral());
        prop_assert_eq!(used.render(&text), fresh.render(&text));
    }
}
