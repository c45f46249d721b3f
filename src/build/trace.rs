// src/build/trace.rs

/// Append-only captured output of one build run.
///
/// Each appended line is terminated with `\n`, so the final text is exactly
/// the concatenation of emitted lines in arrival order. Listeners receive
/// the finished text verbatim; nothing is ever removed or rewritten.
#[derive(Debug, Default)]
pub struct Trace {
    text: String,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one output line (without its line break).
    pub fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
