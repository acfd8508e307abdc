// src/lib.rs
pub mod colors;
pub mod config;
pub mod error;
pub mod formatters;
pub mod keywords;
pub mod pattern_extraction;
pub mod pipeline;
pub mod separator;
pub mod transform;
pub mod tty;

pub use error::*;
pub use pipeline::*;

pub use colors::{Color, ColorTable, Painter};
pub use config::Profile;
pub use keywords::KeywordSet;
pub use pattern_extraction::{Capabilities, ExtractionPattern, Extraction, LogFields};
pub use separator::{GroupKey, GroupKeyTable, SeparatorTracker};
pub use transform::{ContentTransformer, Matcher, TransformRules};
