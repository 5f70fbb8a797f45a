use thiserror::Error;

/// Conditions that make a layout impossible for the given parameters.
///
/// Never surfaced as an `Err` from [`crate::layout::layout`]: the display text
/// becomes the message of an error [`crate::types::LayoutResult`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error(
        "margin overflow: both end margins together ({required}) exceed the total length ({total_length})"
    )]
    MarginOverflow { required: String, total_length: String },
}

/// Rejected caller input, reported before any computation runs.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum InputError {
    #[error("total length must be a positive number, got {0}")]
    InvalidTotalLength(f64),

    #[error("total length {value} exceeds the maximum of {max}")]
    TotalLengthTooLarge { value: f64, max: f64 },

    #[error("{name} must be a non-negative number, got {value}")]
    InvalidMargin { name: &'static str, value: f64 },

    #[error("piece lengths must be non-zero")]
    ZeroPieceLength,

    #[error("{0}")]
    UnknownStrategy(String),
}
