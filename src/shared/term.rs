use std::io::IsTerminal;

use terminal_size::{Width, terminal_size};

/// Width assumed when stdout is a terminal that will not report its size.
pub const DEFAULT_TTY_COLUMNS: u16 = 80;

/// Sample the width of the terminal behind stdout.
///
/// Returns 0 (wrapping disabled) when stdout is redirected, and
/// [`DEFAULT_TTY_COLUMNS`] when the size query fails or reports 0.
pub fn terminal_columns() -> u16 {
    let is_tty = std::io::stdout().is_terminal();
    let reported = terminal_size().map(|(Width(w), _)| w);
    let cols = resolve_columns(is_tty, reported);
    tracing::debug!(is_tty, ?reported, cols, "sampled terminal width");
    cols
}

fn resolve_columns(is_tty: bool, reported: Option<u16>) -> u16 {
    if !is_tty {
        return 0;
    }
    match reported {
        Some(w) if w > 0 => w,
        _ => DEFAULT_TTY_COLUMNS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirected_output_disables_wrapping() {
        assert_eq!(resolve_columns(false, Some(120)), 0);
        assert_eq!(resolve_columns(false, None), 0);
    }

    #[test]
    fn terminal_uses_reported_width() {
        assert_eq!(resolve_columns(true, Some(132)), 132);
    }

    #[test]
    fn terminal_falls_back_to_default() {
        assert_eq!(resolve_columns(true, None), DEFAULT_TTY_COLUMNS);
        assert_eq!(resolve_columns(true, Some(0)), DEFAULT_TTY_COLUMNS);
    }
}
