//! Error types for zeronu

use thiserror::Error;

/// zeronu error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two spectra compared bin-by-bin do not share the same binning.
    #[error("Shape mismatch: {left} vs {right}")]
    ShapeMismatch {
        /// Binning of the left-hand spectrum.
        left: String,
        /// Binning of the right-hand spectrum.
        right: String,
    },

    /// Scan configuration is physically meaningless (inverted bounds, zero step, ...).
    #[error("Invalid scan bounds: {0}")]
    InvalidBounds(String),

    /// A spectrum with zero integral was asked to scale to a non-zero target.
    #[error("Degenerate spectrum: {0}")]
    DegenerateSpectrum(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// Scan aborted through its cancellation flag.
    #[error("Scan cancelled after {completed} of {total} steps")]
    Cancelled {
        /// Steps completed before the flag was observed.
        completed: usize,
        /// Steps planned for the scan.
        total: usize,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message_names_both_sides() {
        let err = Error::ShapeMismatch { left: "10 bins".into(), right: "12 bins".into() };
        let msg = err.to_string();
        assert!(msg.contains("10 bins") && msg.contains("12 bins"), "{msg}");
    }

    #[test]
    fn test_cancelled_message() {
        let err = Error::Cancelled { completed: 3, total: 20 };
        assert_eq!(err.to_string(), "Scan cancelled after 3 of 20 steps");
    }
}
