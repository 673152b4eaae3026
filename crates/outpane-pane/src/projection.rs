#![forbid(unsafe_code)]

//! Result-to-display projection.
//!
//! Turns a [`ResultModel`] into an ordered [`RenderedContent`]:
//!
//! 1. compiler stdout then stderr, styled neutrally, linked when the line
//!    resolves to a source line;
//! 2. `Compiler returned: <code>`;
//! 3. when the program ran, `Program returned: <code>` followed by child
//!    stderr (neutral styler, alert element colour) and child stdout (alert
//!    styler, no element colour). Child lines never link.
//!
//! # Invariants
//!
//! - Output order follows input order exactly.
//! - Projecting the same result twice yields identical content: stylers are
//!   reset at the start of every pass.
//! - Missing streams and a missing execution result contribute nothing.

use std::fmt::Write as _;

use outpane_text::{AnsiMarkup, TextStyler, escape_markup, escape_markup_into};
use tracing::debug_span;
use web_time::Instant;

use crate::config::PaneConfig;
use crate::model::{CompilerId, ResultModel};

/// One displayed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedLine {
    /// A compiler output line; linked when `source_line` is set.
    Compiler {
        markup: String,
        source_line: Option<u32>,
    },
    /// A plain status line such as `Compiler returned: 0`.
    Summary(String),
    /// Output of the executed program.
    Program {
        markup: String,
        color: Option<String>,
    },
}

impl RenderedLine {
    /// Markup (or plain text for summaries) of this entry.
    #[must_use]
    pub fn markup(&self) -> &str {
        match self {
            Self::Compiler { markup, .. } | Self::Program { markup, .. } => markup,
            Self::Summary(text) => text,
        }
    }

    /// Source line this entry links to.
    #[must_use]
    pub fn source_line(&self) -> Option<u32> {
        match self {
            Self::Compiler { source_line, .. } => *source_line,
            Self::Summary(_) | Self::Program { .. } => None,
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Compiler {
                markup,
                source_line: Some(line),
            } => {
                let _ = write!(out, "<p><a data-line=\"{line}\">{markup}</a></p>");
            }
            Self::Compiler {
                markup,
                source_line: None,
            } => {
                let _ = write!(out, "<p>{markup}</p>");
            }
            Self::Summary(text) => {
                out.push_str("<p>");
                escape_markup_into(out, text);
                out.push_str("</p>");
            }
            Self::Program { markup, color } => {
                out.push_str("<p class=\"program-exec-output\"");
                if let Some(color) = color {
                    let _ = write!(out, " style=\"color: {}\"", escape_markup(color));
                }
                let _ = write!(out, ">{markup}</p>");
            }
        }
    }
}

/// Ordered display content of a pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedContent {
    lines: Vec<RenderedLine>,
}

impl RenderedContent {
    #[must_use]
    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RenderedLine> {
        self.lines.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `(index, source_line)` of every linked entry.
    pub fn linked_lines(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| line.source_line().map(|l| (i, l)))
    }

    /// One `<p>` element per entry.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            line.write_html(&mut out);
            out.push('\n');
        }
        out
    }

    /// Entry markup joined by newlines.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(RenderedLine::markup)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Pane title: `#<compiler>`, plus ` with <name>` once a name is known.
#[must_use]
pub fn title(compiler: CompilerId, name: Option<&str>) -> String {
    match name.filter(|n| !n.is_empty()) {
        Some(name) => format!("#{compiler} with {name}"),
        None => format!("#{compiler}"),
    }
}

/// Owns the two stylers and renders results.
pub struct Projector {
    neutral: Box<dyn TextStyler>,
    alert: Box<dyn TextStyler>,
    alert_color: String,
}

impl std::fmt::Debug for Projector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projector")
            .field("alert_color", &self.alert_color)
            .finish_non_exhaustive()
    }
}

impl Projector {
    /// A projector over arbitrary stylers.
    #[must_use]
    pub fn new(
        neutral: Box<dyn TextStyler>,
        alert: Box<dyn TextStyler>,
        alert_color: impl Into<String>,
    ) -> Self {
        Self {
            neutral,
            alert,
            alert_color: alert_color.into(),
        }
    }

    /// [`AnsiMarkup`] stylers with the configured palettes.
    #[must_use]
    pub fn from_config(config: &PaneConfig) -> Self {
        Self::new(
            Box::new(AnsiMarkup::new(config.neutral.clone())),
            Box::new(AnsiMarkup::new(config.alert.clone())),
            config.alert_color.clone(),
        )
    }

    /// Render `result` from scratch.
    pub fn project(&mut self, result: &ResultModel) -> RenderedContent {
        let start = Instant::now();
        let span = debug_span!(
            "outpane.project",
            lines = tracing::field::Empty,
            duration_us = tracing::field::Empty
        );
        let _enter = span.enter();

        self.neutral.reset();
        self.alert.reset();

        let mut lines = Vec::with_capacity(result.stdout.len() + result.stderr.len() + 2);
        for line in result.compiler_lines() {
            lines.push(RenderedLine::Compiler {
                markup: self.neutral.render(&line.text),
                source_line: line.source_line(),
            });
        }
        lines.push(RenderedLine::Summary(format!(
            "Compiler returned: {}",
            result.code
        )));

        if let Some(exec) = &result.exec_result {
            lines.push(RenderedLine::Summary(format!(
                "Program returned: {}",
                exec.code
            )));
            if exec.has_output() {
                for line in &exec.stderr {
                    lines.push(RenderedLine::Program {
                        markup: self.neutral.render(&line.text),
                        color: Some(self.alert_color.clone()),
                    });
                }
                for line in &exec.stdout {
                    lines.push(RenderedLine::Program {
                        markup: self.alert.render(&line.text),
                        color: None,
                    });
                }
            }
        }

        span.record("lines", lines.len());
        span.record("duration_us", start.elapsed().as_micros() as u64);
        RenderedContent { lines }
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::from_config(&PaneConfig::default())
    }
}
