//! Terminal styling for git-promote output
//!
//! | Method       | Color  | Stream | Used for                            |
//! |--------------|--------|--------|-------------------------------------|
//! | `.accent()`  | Cyan   | stdout | branches, request numbers, counts   |
//! | `.success()` | Green  | stdout | finished phases                     |
//! | `.error()`   | Red    | stderr | error codes and messages            |
//! | `.warn()`    | Yellow | stderr | degraded steps (no origin, ...)     |
//! | `.muted()`   | Dim    | stdout | paths, dates, hints                 |
//! | `.emphasis()`| Bold   | stdout | headings                            |
//!
//! Color support (`NO_COLOR`, `CLICOLOR`, TTY) is decided by `owo-colors`.

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Style};
use std::fmt::{self, Display};
use std::sync::OnceLock;

pub use owo_colors::Stream;

const ACCENT: Style = Style::new().cyan();
const SUCCESS: Style = Style::new().green();
const ERROR: Style = Style::new().red();
const WARN: Style = Style::new().yellow();
const MUTED: Style = Style::new().dimmed();
const EMPHASIS: Style = Style::new().bold();

/// A value rendered with a style when the target stream supports color
#[derive(Clone, Debug)]
pub struct Styled<T> {
    value: T,
    style: Style,
    stream: Stream,
}

impl<T> Styled<T> {
    const fn new(value: T, style: Style, stream: Stream) -> Self {
        Self {
            value,
            style,
            stream,
        }
    }

    /// Decide color support against stderr
    #[must_use]
    pub const fn for_stderr(mut self) -> Self {
        self.stream = Stream::Stderr;
        self
    }
}

impl<T: Display> Display for Styled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.value
                .if_supports_color(self.stream, |v| v.style(self.style))
        )
    }
}

/// Semantic styling for anything printable
pub trait Stylize: Display {
    /// Cyan, for branch names and request numbers
    fn accent(&self) -> Styled<&Self> {
        Styled::new(self, ACCENT, Stream::Stdout)
    }

    /// Green, for completed steps
    fn success(&self) -> Styled<&Self> {
        Styled::new(self, SUCCESS, Stream::Stdout)
    }

    /// Red on stderr
    fn error(&self) -> Styled<&Self> {
        Styled::new(self, ERROR, Stream::Stderr)
    }

    /// Yellow on stderr
    fn warn(&self) -> Styled<&Self> {
        Styled::new(self, WARN, Stream::Stderr)
    }

    /// Dimmed secondary text
    fn muted(&self) -> Styled<&Self> {
        Styled::new(self, MUTED, Stream::Stdout)
    }

    /// Bold
    fn emphasis(&self) -> Styled<&Self> {
        Styled::new(self, EMPHASIS, Stream::Stdout)
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Green checkmark
pub const fn check() -> Styled<&'static str> {
    Styled::new("✓", SUCCESS, Stream::Stdout)
}

/// Red cross, on stderr
pub const fn cross() -> Styled<&'static str> {
    Styled::new("✗", ERROR, Stream::Stderr)
}

/// Dimmed bullet for list items
pub const fn bullet() -> Styled<&'static str> {
    Styled::new("○", MUTED, Stream::Stdout)
}

/// Clickable URL where the terminal supports OSC 8, plain text otherwise
pub fn hyperlink_url(stream: Stream, url: &str) -> String {
    let hyperlink_stream = match stream {
        Stream::Stdout => supports_hyperlinks::Stream::Stdout,
        Stream::Stderr => supports_hyperlinks::Stream::Stderr,
    };
    if supports_hyperlinks::on(hyperlink_stream) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}

/// Cyan dots spinner shown while a phase runs
pub fn spinner_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("hardcoded spinner template is valid")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        })
        .clone()
}
