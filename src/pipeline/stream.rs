// src/pipeline/stream.rs
use std::io::{BufRead, ErrorKind, Write};
use std::time::Instant;

use crate::error::ProcessingError;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::context::{ProcessedLine, ProcessingStats};
use crate::separator::GroupKey;

/// Per-line formatting step driven by the pipeline
pub trait LineProcessor: Send {
    fn process(&mut self, raw: &[u8]) -> ProcessedLine;
    fn name(&self) -> &str;
    fn reset(&mut self) {} // Called between files/streams

    /// Line written before the first line of a new message group
    fn separator_line(&self, _key: GroupKey, _width: usize) -> Option<String> {
        None
    }
}

/// Reads raw lines, runs them through a processor and writes the survivors
pub struct StreamPipeline {
    processor: Box<dyn LineProcessor>,
    config: PipelineConfig,
    stats: ProcessingStats,
    last_group: Option<GroupKey>,
}

impl StreamPipeline {
    pub fn new(config: PipelineConfig, processor: Box<dyn LineProcessor>) -> Self {
        StreamPipeline {
            processor,
            config,
            stats: ProcessingStats::default(),
            last_group: None,
        }
    }

    /// Process a single file/stream
    pub fn process_stream<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        output: &mut W,
        filename: Option<&str>,
    ) -> Result<ProcessingStats, ProcessingError> {
        let start_time = Instant::now();
        let mut file_stats = ProcessingStats::default();

        // Filter memory does not carry over between files
        self.processor.reset();
        self.last_group = None;

        log::debug!(
            "{}: processing {}",
            self.processor.name(),
            filename.unwrap_or("<stdin>")
        );

        let mut raw = Vec::with_capacity(self.config.buffer_size.min(4096));
        loop {
            raw.clear();
            match input.read_until(b'\n', &mut raw) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ProcessingError::IoError(e)),
            }
            file_stats.lines_seen += 1;

            let processed = self.processor.process(&raw);
            let text = match (processed.matched, processed.line) {
                (true, Some(text)) => text,
                _ => {
                    file_stats.lines_suppressed += 1;
                    continue;
                }
            };

            let result = self
                .write_separator(output, processed.group_key, &mut file_stats)
                .and_then(|_| writeln!(output, "{}", text).map_err(ProcessingError::from));

            match result {
                Ok(()) => file_stats.lines_output += 1,
                // Downstream closed (e.g. piped into head): stop quietly
                Err(ProcessingError::IoError(e)) if e.kind() == ErrorKind::BrokenPipe => {
                    log::debug!("output closed, stopping");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        file_stats.processing_time = start_time.elapsed();
        self.stats.accumulate(&file_stats);

        if self.config.debug {
            eprintln!(
                "logtint: {}: {} lines, {} shown, {} suppressed",
                filename.unwrap_or("<stdin>"),
                file_stats.lines_seen,
                file_stats.lines_output,
                file_stats.lines_suppressed
            );
        }

        Ok(file_stats)
    }

    fn write_separator<W: Write>(
        &mut self,
        output: &mut W,
        group_key: Option<GroupKey>,
        stats: &mut ProcessingStats,
    ) -> Result<(), ProcessingError> {
        let key = match group_key {
            Some(key) if self.last_group != Some(key) => key,
            _ => return Ok(()),
        };
        self.last_group = Some(key);

        if let Some(banner) = self.processor.separator_line(key, self.config.banner_width) {
            writeln!(output, "{}", banner)?;
            stats.separators_written += 1;
        }
        Ok(())
    }

    /// Get current accumulated stats
    pub fn get_stats(&self) -> &ProcessingStats {
        &self.stats
    }
}
