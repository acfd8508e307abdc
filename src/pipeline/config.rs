use serde::{Deserialize, Serialize};

/// Configuration for stream driving
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub debug: bool,
    pub buffer_size: usize,
    /// Width of the banner written when the message group changes
    pub banner_width: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            debug: false,
            buffer_size: 65536, // 64KB
            banner_width: 80,
        }
    }
}

/// Shape of the incoming log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    #[default]
    #[value(name = "default")]
    Default,
    /// Lines carry no timestamp; tag keywords are also tested against the message
    #[value(name = "notime")]
    NoTime,
}

/// Per-line formatting behavior
#[derive(Debug, Clone, Default)]
pub struct ProcessorConfig {
    pub hide_same_tags: bool,
    pub log_type: LogType,
    pub use_colors: bool,
    /// Terminal width, when known, handed to the message wrapper
    pub width: Option<usize>,
}

impl ProcessorConfig {
    pub fn no_time_mode(&self) -> bool {
        self.log_type == LogType::NoTime
    }
}
