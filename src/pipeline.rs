pub mod config;
pub mod context;
pub mod filter;
pub mod processor;
pub mod stream;

pub use config::{LogType, PipelineConfig, ProcessorConfig};
pub use context::{FilterState, ProcessedLine, ProcessingStats};
pub use filter::{FilterInput, KeywordFilter};
pub use processor::LogProcessor;
pub use stream::{LineProcessor, StreamPipeline};
