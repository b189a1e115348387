use thiserror::Error;

/// Errors raised while loading the blueprint table. Extraction itself never
/// errors; see [`crate::Extractor`].
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot read blueprint file {path}: {source}")]
    BlueprintIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("blueprint file is not valid YAML: {0}")]
    BlueprintParse(#[from] serde_yaml::Error),

    #[error("invalid blueprint for {context}: {reason}")]
    BlueprintInvalid { context: String, reason: String },
}
