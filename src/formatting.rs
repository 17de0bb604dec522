use chrono::{DateTime, TimeZone};
use yansi::Paint;

pub const DATE_FMT: &str = "%a %d %b %Y %I:%M:%S %p %Z";

/// Category of a piece of wrapped text, used to pick its color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordKind {
    /// Whole value that fit on the current line.
    Whole,
    /// Word laid out by the word-by-word wrapper.
    Wrapped,
    /// Word wider than any line; written unsplit.
    Oversized,
}

/// Formatting context passed through the table printer and the wrapper
pub struct FormatContext {
    pub use_color: bool,
    /// Draw pads and continuation indents visibly.
    pub debug_layout: bool,
}

impl FormatContext {
    pub fn new(use_color: bool) -> Self {
        Self { use_color, debug_layout: false }
    }

    pub fn with_debug_layout(mut self, enabled: bool) -> Self {
        self.debug_layout = enabled;
        self
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn format_label(&self, label: &str) -> String {
        if self.use_color {
            Paint::new(label).bold().to_string()
        } else {
            label.to_string()
        }
    }

    pub fn format_none(&self) -> String {
        if self.use_color {
            Paint::new("None").dim().to_string()
        } else {
            "None".to_string()
        }
    }

    /// Words only carry color in layout-debug mode.
    pub fn format_word(&self, word: &str, kind: WordKind) -> String {
        if !(self.use_color && self.debug_layout) {
            return word.to_string();
        }
        match kind {
            WordKind::Whole => Paint::yellow(word).to_string(),
            WordKind::Wrapped => Paint::red(word).to_string(),
            WordKind::Oversized => Paint::blue(word).to_string(),
        }
    }

    /// Text written at the start of a continuation line, `indent` columns wide.
    pub fn continuation(&self, indent: usize) -> String {
        const MARKER: &str = "-->";
        if !self.debug_layout || indent < MARKER.len() {
            return " ".repeat(indent);
        }
        let marker = format!("{MARKER:<indent$}");
        if self.use_color {
            Paint::red(&marker).bold().to_string()
        } else {
            marker
        }
    }

    pub fn pad_char(&self) -> char {
        if self.debug_layout { '_' } else { ' ' }
    }
}

/// Human-readable byte count using binary units, as pacman prints sizes.
pub fn humanize_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Format a unix timestamp in the given zone; `None` for out-of-range values.
pub fn format_date<Tz>(secs: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.with_timezone(tz).format(DATE_FMT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_context_no_color() {
        let ctx = FormatContext::new(false);
        assert_eq!(ctx.format_label("Name"), "Name");
        assert_eq!(ctx.format_none(), "None");
        assert_eq!(ctx.format_word("glibc", WordKind::Wrapped), "glibc");
    }

    #[test]
    fn test_format_context_with_color() {
        let ctx = FormatContext::new(true);
        let label = ctx.format_label("Name");
        assert!(label.contains("Name"));
        assert!(label.len() > "Name".len()); // Has ANSI codes
    }

    #[test]
    fn test_words_colored_only_in_debug_layout() {
        let ctx = FormatContext::new(true);
        assert_eq!(ctx.format_word("bash", WordKind::Whole), "bash");

        let ctx = FormatContext::new(true).with_debug_layout(true);
        assert_ne!(ctx.format_word("bash", WordKind::Whole), "bash");
        assert_ne!(
            ctx.format_word("bash", WordKind::Whole),
            ctx.format_word("bash", WordKind::Oversized)
        );
    }

    #[test]
    fn test_continuation() {
        let ctx = FormatContext::plain();
        assert_eq!(ctx.continuation(4), "    ");
        assert_eq!(ctx.pad_char(), ' ');

        let ctx = FormatContext::plain().with_debug_layout(true);
        assert_eq!(ctx.continuation(5), "-->  ");
        assert_eq!(ctx.continuation(2), "  ");
        assert_eq!(ctx.pad_char(), '_');
    }

    #[test]
    fn test_humanize_size() {
        assert_eq!(humanize_size(0), "0.00 B");
        assert_eq!(humanize_size(1023), "1023.00 B");
        assert_eq!(humanize_size(1536), "1.50 KiB");
        assert_eq!(humanize_size(5 * 1024 * 1024), "5.00 MiB");
    }

    #[test]
    fn test_format_date_utc() {
        assert_eq!(
            format_date(0, &Utc).as_deref(),
            Some("Thu 01 Jan 1970 12:00:00 AM UTC")
        );
        assert!(format_date(i64::MAX, &Utc).is_none());
    }
}
