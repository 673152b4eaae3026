#![forbid(unsafe_code)]

//! Text styling for outpane.
//!
//! Compiler and program output arrives as raw text that may carry ANSI SGR
//! escapes. Before it reaches a display it goes through a [`TextStyler`],
//! which must escape untrusted content and turn styling escapes into
//! markup. [`AnsiMarkup`] is the stock implementation.
//!
//! # Key Components
//!
//! - [`TextStyler`] - the narrow interface the pane depends on
//! - [`AnsiMarkup`] - streaming ANSI-to-HTML converter built on `vte`
//! - [`Palette`] - default foreground/background for a styler instance
//! - [`escape_markup`] - markup escaping for untrusted text

pub mod ansi;
pub mod escape;
pub mod palette;

pub use ansi::AnsiMarkup;
pub use escape::{escape_markup, escape_markup_into};
pub use palette::Palette;

/// Converts raw output text into safe markup.
///
/// Implementations may keep decode state between calls (a colour opened in
/// one line still applies to the next) until [`TextStyler::reset`].
pub trait TextStyler {
    /// Style one chunk of raw text. Never fails; the result is opaque markup.
    fn render(&mut self, raw: &str) -> String;

    /// Forget any decode state carried over from earlier calls.
    fn reset(&mut self);
}

impl<S: TextStyler + ?Sized> TextStyler for Box<S> {
    fn render(&mut self, raw: &str) -> String {
        (**self).render(raw)
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}
