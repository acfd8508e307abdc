use crate::separator::GroupKey;
use std::time::Duration;

/// Filter memory carried from one line of a stream to the next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// Tag most recently rendered in the tag column
    pub last_tag: Option<String>,
    /// Verdict inherited by continuation lines that carry no tag
    pub previous_line_matched: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            last_tag: None,
            previous_line_matched: true,
        }
    }
}

/// Result of processing one raw line. When `matched` is false the line is
/// suppressed and the other fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedLine {
    pub group_key: Option<GroupKey>,
    pub line: Option<String>,
    pub matched: bool,
}

impl ProcessedLine {
    /// Nothing to emit for this line
    pub fn none() -> Self {
        Self::default()
    }

    pub fn emitted(group_key: Option<GroupKey>, line: String) -> Self {
        ProcessedLine {
            group_key,
            line: Some(line),
            matched: true,
        }
    }
}

/// Runtime statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub lines_seen: usize,
    pub lines_output: usize,
    pub lines_suppressed: usize,
    pub separators_written: usize,
    pub processing_time: Duration,
}

impl ProcessingStats {
    pub fn accumulate(&mut self, other: &ProcessingStats) {
        self.lines_seen += other.lines_seen;
        self.lines_output += other.lines_output;
        self.lines_suppressed += other.lines_suppressed;
        self.separators_written += other.separators_written;
        self.processing_time += other.processing_time;
    }
}
