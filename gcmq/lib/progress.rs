//! Text sinks for progress reports emitted during long computations.
//!
//! Sinks are purely observational: nothing they do affects results. They are
//! only ever called from the thread running
//! [`Solver::compute`][crate::solve::Solver::compute].

use log::info;

/// Receiver for progress messages.
pub trait ProgressSink {
    /// Emit one line of text at the current indentation.
    fn write(&mut self, msg: &str);

    /// Change the indentation level by `delta` (clamped at zero).
    fn indent(&mut self, delta: isize);
}

fn shift(level: usize, delta: isize) -> usize {
    level.saturating_add_signed(delta)
}

/// Discards everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn write(&mut self, _msg: &str) { }

    fn indent(&mut self, _delta: isize) { }
}

/// Forwards messages to the [`log`] facade at `info` level.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogSink {
    level: usize,
}

impl ProgressSink for LogSink {
    fn write(&mut self, msg: &str) {
        info!("{:width$}{}", "", msg, width = 2 * self.level);
    }

    fn indent(&mut self, delta: isize) { self.level = shift(self.level, delta); }
}

/// Collects messages into an in-memory buffer, one line each.
#[derive(Clone, Debug, Default)]
pub struct TextSink {
    level: usize,
    lines: Vec<String>,
}

impl TextSink {
    pub fn new() -> Self { Self::default() }

    /// Lines written so far, indentation included.
    pub fn lines(&self) -> &[String] { &self.lines }

    /// Join all lines with newlines.
    pub fn text(&self) -> String { self.lines.join("\n") }
}

impl ProgressSink for TextSink {
    fn write(&mut self, msg: &str) {
        self.lines.push(format!("{:width$}{}", "", msg, width = 2 * self.level));
    }

    fn indent(&mut self, delta: isize) { self.level = shift(self.level, delta); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_sink_indents() {
        let mut sink = TextSink::new();
        sink.write("a");
        sink.indent(1);
        sink.write("b");
        sink.indent(-3);
        sink.write("c");
        assert_eq!(sink.lines(), ["a", "  b", "c"]);
        assert_eq!(sink.text(), "a\n  b\nc");
    }
}
