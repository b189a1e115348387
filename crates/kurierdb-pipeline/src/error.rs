use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A field the data model cannot do without was not scraped. Everything
    /// else degrades to an absent value instead of failing the record.
    #[error("{stamp}: required field '{field}' is missing")]
    MissingField { stamp: String, field: &'static str },

    #[error("{stamp}: field '{field}' has unusable value '{value}'")]
    InvalidField {
        stamp: String,
        field: &'static str,
        value: String,
    },
}
