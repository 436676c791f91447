//! Terminal logging with colored module prefixes.
//!
//! Provides two macros:
//! - `log!` for normal output
//! - `debug!` for diagnostics, printed only when verbose mode is enabled
//!
//! # Example
//!
//! ```ignore
//! log!("build"; "writing {}", path.display());
//! debug!("assets"; "probing {}", candidate);
//! ```

use colored::{ColoredString, Colorize};
use crossterm::terminal::size;
use std::{
    io::{Write, stderr},
    sync::{
        OnceLock,
        atomic::{AtomicBool, Ordering},
    },
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Whether `debug!` output is enabled
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Length of brackets around module name plus trailing space: "[x] "
const PREFIX_OVERHEAD: usize = 3;

/// Enable or disable `debug!` output.
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::Relaxed);
}

/// Get terminal width, cached after first call.
/// Falls back to 120 columns if detection fails.
fn get_terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a diagnostic message, shown only with `--debug`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Whether verbose mode is on.
#[inline]
pub fn verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix.
///
/// Single-line messages are truncated to fit the terminal width; multiline
/// messages (error chains) are printed whole.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let width = get_terminal_width() as usize;

    let mut stderr = stderr().lock();

    if message.contains('\n') {
        writeln!(stderr, "{prefix} {message}").ok();
    } else {
        let max_msg_len = width.saturating_sub(module.len() + PREFIX_OVERHEAD);
        writeln!(stderr, "{prefix} {}", truncate_str(message, max_msg_len)).ok();
    }
}

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module {
        "serve" => prefix.bright_blue().bold(),
        "watch" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to fit within `max_len` bytes.
///
/// Ensures the result is valid UTF-8 by finding the nearest character boundary.
#[inline]
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_short_string() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_str_exact_length() {
        assert_eq!(truncate_str("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_str_needs_truncation() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_str_unicode_boundary() {
        // "€" is 3 bytes; truncating at byte 4 must fall back to byte 3
        assert_eq!(truncate_str("€€", 4), "€");
        assert_eq!(truncate_str("€€", 3), "€");
        assert_eq!(truncate_str("€€", 6), "€€");
    }

    #[test]
    fn test_truncate_str_zero_limit() {
        assert_eq!(truncate_str("hello", 0), "");
    }

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(verbose());
        set_verbose(false);
        assert!(!verbose());
    }
}
