#![forbid(unsafe_code)]

//! Markup escaping for untrusted output text.

/// Escape `s` for inclusion in HTML text or attribute values.
#[must_use]
pub fn escape_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_markup_into(&mut out, s);
    out
}

/// Escape `s` into `out`.
pub fn escape_markup_into(out: &mut String, s: &str) {
    for c in s.chars() {
        push_escaped(out, c);
    }
}

pub(crate) fn push_escaped(out: &mut String, c: char) {
    match c {
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '&' => out.push_str("&amp;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#x27;"),
        _ => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_special_chars() {
        assert_eq!(
            escape_markup(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(escape_markup("error: expected ';'"), "error: expected &#x27;;&#x27;");
        assert_eq!(escape_markup("main.cpp:3:5"), "main.cpp:3:5");
    }

    #[test]
    fn escape_into_appends() {
        let mut out = String::from("x=");
        escape_markup_into(&mut out, "a<b");
        assert_eq!(out, "x=a&lt;b");
    }
}
