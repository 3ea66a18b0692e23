//! Code fence tracking for image rewriting.
//!
//! Image syntax inside fenced code blocks is shown verbatim by the host
//! renderer, so the preprocessor must leave it alone.

/// Tracks backtick fence state during line-by-line processing.
///
/// A fence opens on any line that, once trimmed, starts with three or more
/// backticks (an info string may follow). It closes on a trimmed line made of
/// exactly the same number of backticks.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    /// Length of the opening backtick run, 0 outside a fence.
    fence_len: usize,
}

impl FenceTracker {
    /// Create a new fence tracker.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Check if currently inside a fenced code block.
    pub(crate) fn in_fence(&self) -> bool {
        self.fence_len > 0
    }

    /// Update fence state based on a line.
    ///
    /// Returns `true` if the line is a fence marker (opening or closing).
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim();

        if self.in_fence() {
            if is_closing_fence(trimmed, self.fence_len) {
                tracing::trace!(len = self.fence_len, "Code fence closed");
                self.fence_len = 0;
                return true;
            }
            false
        } else if let Some(len) = detect_fence(trimmed) {
            tracing::trace!(len, "Code fence opened");
            self.fence_len = len;
            true
        } else {
            false
        }
    }
}

/// Length of the leading backtick run if it is long enough to open a fence.
fn detect_fence(trimmed: &str) -> Option<usize> {
    let count = backtick_run(trimmed);
    (count >= 3).then_some(count)
}

fn is_closing_fence(trimmed: &str, len: usize) -> bool {
    trimmed.len() == len && backtick_run(trimmed) == len
}

fn backtick_run(s: &str) -> usize {
    s.bytes().take_while(|&b| b == b'`').count()
}
