use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid pattern descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Could not read config file '{}': {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in '{}': {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Config include cycle at '{}'", .0.display())]
    IncludeCycle(PathBuf),
}

impl ConfigError {
    pub(crate) fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    }
}
