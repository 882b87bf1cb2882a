use thiserror::Error;

/// Errors raised by judgment configs, colors, and text art.
#[derive(Error, Debug)]
pub enum HsvError {
    /// Malformed hex literal, pattern name, merge strategy, or config file.
    #[error("format error: {0}")]
    Format(String),

    /// A numeric value outside its documented interval.
    #[error("out of range: {0}")]
    Range(String),

    /// An image or file could not be read, written, or decoded.
    #[error("cannot access {what}: {source}")]
    Resource {
        what: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A structurally invalid call, e.g. merging zero configs.
    #[error("invalid argument: {0}")]
    Value(String),
}

impl HsvError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub(crate) fn range(msg: impl Into<String>) -> Self {
        Self::Range(msg.into())
    }

    pub(crate) fn resource(
        what: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Resource {
            what: what.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, HsvError>;
