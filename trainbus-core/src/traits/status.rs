//! Status line output
//!
//! Nodes carry a small character display for diagnostics. The bus layer
//! writes to it when a fault halts the node and when the halt line
//! glitches.

use core::fmt::{self, Write};

use heapless::String;

/// Width of one status line in characters
pub const STATUS_WIDTH: usize = 20;

/// One status line, at most [`STATUS_WIDTH`] bytes
pub type StatusLine = String<STATUS_WIDTH>;

/// Trait for the diagnostic display
pub trait StatusSink {
    /// Show one line of at most [`STATUS_WIDTH`] characters
    ///
    /// Implementations may assume the line already fits.
    fn display(&mut self, line: &str);

    /// Format and show a line, cut to [`STATUS_WIDTH`]
    fn show(&mut self, args: fmt::Arguments<'_>) {
        self.display(&status_line(args));
    }
}

/// No display fitted
impl StatusSink for () {
    fn display(&mut self, _line: &str) {}
}

impl<T: StatusSink + ?Sized> StatusSink for &mut T {
    fn display(&mut self, line: &str) {
        T::display(self, line)
    }
}

/// Format a status line, silently cutting it at [`STATUS_WIDTH`]
pub fn status_line(args: fmt::Arguments<'_>) -> StatusLine {
    let mut line = StatusLine::new();
    // Truncating never reports an error
    let _ = Truncating(&mut line).write_fmt(args);
    line
}

struct Truncating<'a>(&'a mut StatusLine);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_line_unchanged() {
        let line = status_line(format_args!("Got btn {:2}.", 7));
        assert_eq!(line.as_str(), "Got btn  7.");
    }

    #[test]
    fn test_long_line_truncated() {
        let line = status_line(format_args!("{}", "RS485 in buf overflow detected"));
        assert_eq!(line.len(), STATUS_WIDTH);
        assert_eq!(line.as_str(), "RS485 in buf overflo");
    }

    #[test]
    fn test_show_truncates_before_display() {
        struct Last(std::string::String);

        impl StatusSink for Last {
            fn display(&mut self, line: &str) {
                self.0 = line.into();
            }
        }

        let mut sink = Last(std::string::String::new());
        sink.show(format_args!("node {} {}", 3, "lost its request line"));
        assert_eq!(sink.0, "node 3 lost its requ");
    }

    #[test]
    fn test_multibyte_char_not_split() {
        // 19 ASCII chars then a 2-byte char that does not fit
        let line = status_line(format_args!("{}é", "aaaaaaaaaaaaaaaaaaa"));
        assert_eq!(line.len(), 19);
    }
}
