#![forbid(unsafe_code)]

//! Streaming ANSI SGR to HTML markup conversion.
//!
//! [`AnsiMarkup`] feeds raw text through a `vte` parser and emits escaped
//! text wrapped in `<span style="...">` elements for the active SGR state.
//!
//! # Invariants
//!
//! 1. **Safe output**: every printable character goes through markup
//!    escaping; escape sequences never leak into the output.
//! 2. **Self-contained calls**: each `render` result closes every span it
//!    opened, so results can be placed in independent elements.
//! 3. **Streaming state**: SGR attributes (and a partially received escape
//!    sequence) carry over to the next `render` call until `reset`.
//!
//! # Supported SGR codes
//!
//! | Code | Effect |
//! |------|--------|
//! | 0 | reset all |
//! | 1 / 22 | bold on / off |
//! | 3 / 23 | italic on / off |
//! | 4 / 24 | underline on / off |
//! | 7 / 27 | inverse on / off |
//! | 30-37, 90-97 | 16-colour foreground |
//! | 40-47, 100-107 | 16-colour background |
//! | 38;5;n / 48;5;n | 256-colour |
//! | 38;2;r;g;b / 48;2;r;g;b | true colour |
//! | 39 / 49 | palette default foreground / background |
//!
//! Anything else (cursor movement, erase, OSC) is dropped silently.

use std::fmt;

use vte::{Params, Parser, Perform};

use crate::TextStyler;
use crate::escape::push_escaped;
use crate::palette::Palette;

const BASE16: [&str; 16] = [
    "#000", "#A00", "#0A0", "#A50", "#00A", "#A0A", "#0AA", "#AAA", "#555", "#F55", "#5F5",
    "#FF5", "#55F", "#F5F", "#5FF", "#FFF",
];

/// CSS colour for an xterm 256-colour index.
fn indexed_color(n: u8) -> String {
    match n {
        0..=15 => BASE16[n as usize].to_string(),
        16..=231 => {
            let i = n - 16;
            let level = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            format!(
                "#{:02x}{:02x}{:02x}",
                level(i / 36),
                level((i % 36) / 6),
                level(i % 6)
            )
        }
        _ => {
            let v = 8 + (n - 232) * 10;
            format!("#{v:02x}{v:02x}{v:02x}")
        }
    }
}

/// Decode the arguments following 38/48.
///
/// Returns the colour (if well formed) and how many arguments were used.
fn extended_color(args: &[u16]) -> (Option<String>, usize) {
    match args.first() {
        Some(5) => match args.get(1) {
            Some(&n) => (Some(indexed_color(n.min(255) as u8)), 2),
            None => (None, 1),
        },
        Some(2) if args.len() >= 4 => {
            let c = |v: u16| v.min(255);
            (
                Some(format!(
                    "#{:02x}{:02x}{:02x}",
                    c(args[1]),
                    c(args[2]),
                    c(args[3])
                )),
                4,
            )
        }
        Some(2) => (None, args.len()),
        _ => (None, 0),
    }
}

/// Active graphic rendition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SgrState {
    fg: Option<String>,
    bg: Option<String>,
    bold: bool,
    italic: bool,
    underline: bool,
    inverse: bool,
}

impl SgrState {
    fn apply(&mut self, params: &Params, palette: &Palette) {
        let groups: Vec<&[u16]> = params.iter().collect();
        if groups.is_empty() {
            *self = Self::default();
            return;
        }

        let mut i = 0;
        while i < groups.len() {
            let group = groups[i];
            let code = group.first().copied().unwrap_or(0);
            let mut consumed = 0;
            match code {
                0 => *self = Self::default(),
                1 => self.bold = true,
                22 => self.bold = false,
                3 => self.italic = true,
                23 => self.italic = false,
                4 => self.underline = true,
                24 => self.underline = false,
                7 => self.inverse = true,
                27 => self.inverse = false,
                30..=37 => self.fg = Some(indexed_color((code - 30) as u8)),
                90..=97 => self.fg = Some(indexed_color((code - 90 + 8) as u8)),
                39 => self.fg = Some(palette.fg.clone()),
                40..=47 => self.bg = Some(indexed_color((code - 40) as u8)),
                100..=107 => self.bg = Some(indexed_color((code - 100 + 8) as u8)),
                49 => self.bg = Some(palette.bg.clone()),
                38 | 48 => {
                    // Colon form carries its arguments inside the group,
                    // semicolon form spreads them over the following groups.
                    let color = if group.len() > 1 {
                        extended_color(&group[1..]).0
                    } else {
                        let rest: Vec<u16> = groups[i + 1..]
                            .iter()
                            .map(|g| g.first().copied().unwrap_or(0))
                            .collect();
                        let (color, used) = extended_color(&rest);
                        consumed = used;
                        color
                    };
                    if let Some(color) = color {
                        if code == 38 {
                            self.fg = Some(color);
                        } else {
                            self.bg = Some(color);
                        }
                    }
                }
                _ => {}
            }
            i += 1 + consumed;
        }
    }

    fn css(&self, palette: &Palette) -> Option<String> {
        let (fg, bg) = if self.inverse {
            (
                Some(self.bg.clone().unwrap_or_else(|| palette.bg.clone())),
                Some(self.fg.clone().unwrap_or_else(|| palette.fg.clone())),
            )
        } else {
            (self.fg.clone(), self.bg.clone())
        };

        let mut parts = Vec::new();
        if let Some(fg) = fg {
            parts.push(format!("color:{fg}"));
        }
        if let Some(bg) = bg {
            parts.push(format!("background-color:{bg}"));
        }
        if self.bold {
            parts.push("font-weight:bold".to_string());
        }
        if self.italic {
            parts.push("font-style:italic".to_string());
        }
        if self.underline {
            parts.push("text-decoration:underline".to_string());
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(";"))
        }
    }
}

/// `vte` performer writing markup for one `render` call.
struct MarkupWriter<'a> {
    out: String,
    state: &'a mut SgrState,
    palette: &'a Palette,
    open: Option<String>,
    dirty: bool,
}

impl MarkupWriter<'_> {
    /// Make the open span match the current state before text is written.
    fn sync_span(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        let css = self.state.css(self.palette);
        if css == self.open {
            return;
        }
        if self.open.is_some() {
            self.out.push_str("</span>");
        }
        if let Some(css) = &css {
            self.out.push_str("<span style=\"");
            for c in css.chars() {
                push_escaped(&mut self.out, c);
            }
            self.out.push_str("\">");
        }
        self.open = css;
    }

    fn finish(mut self) -> String {
        if self.open.take().is_some() {
            self.out.push_str("</span>");
        }
        self.out
    }
}

impl Perform for MarkupWriter<'_> {
    fn print(&mut self, c: char) {
        self.sync_span();
        push_escaped(&mut self.out, c);
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\t' | b'\n') {
            self.sync_span();
            self.out.push(char::from(byte));
        }
    }

    fn csi_dispatch(&mut self, params: &Params, _intermediates: &[u8], ignore: bool, c: char) {
        if ignore || c != 'm' {
            tracing::trace!(action = %c, ignore, "dropping non-SGR escape");
            return;
        }
        self.state.apply(params, self.palette);
        self.dirty = true;
    }
}

/// Streaming ANSI-to-HTML styler.
pub struct AnsiMarkup {
    palette: Palette,
    parser: Parser,
    state: SgrState,
}

impl fmt::Debug for AnsiMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnsiMarkup")
            .field("palette", &self.palette)
            .field("styled", &self.is_styled())
            .finish_non_exhaustive()
    }
}

impl AnsiMarkup {
    /// Create a styler with the given default colours.
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            parser: Parser::new(),
            state: SgrState::default(),
        }
    }

    /// Default colours of this styler.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Whether SGR attributes from earlier calls are still active.
    #[must_use]
    pub fn is_styled(&self) -> bool {
        self.state != SgrState::default()
    }
}

impl TextStyler for AnsiMarkup {
    fn render(&mut self, raw: &str) -> String {
        let mut writer = MarkupWriter {
            out: String::with_capacity(raw.len()),
            state: &mut self.state,
            palette: &self.palette,
            open: None,
            dirty: true,
        };
        self.parser.advance(&mut writer, raw.as_bytes());
        writer.finish()
    }

    fn reset(&mut self) {
        self.parser = Parser::new();
        self.state = SgrState::default();
    }
}
