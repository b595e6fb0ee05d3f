//! Error types for the plane-engine core.

use thiserror::Error;

/// Errors produced by grid construction, field buffers, and engine setup.
///
/// Numeric hot loops never produce these: division by zero at a field
/// singularity or a NaN direction is absorbed by sentinel values instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero, or `width * height` overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A math range whose lower bound is not strictly below its upper bound.
    #[error("invalid range: x_min ({x_min}) must be less than x_max ({x_max})")]
    InvalidRange { x_min: f64, x_max: f64 },

    /// A serialized grid range string could not be parsed.
    #[error("invalid grid range string: {0}")]
    InvalidGridRange(String),

    /// Two grids or fields had incompatible dimensions.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A flat buffer did not have the length its grid requires.
    #[error("size mismatch: expected {expected} values, got {got}")]
    SizeMismatch { expected: usize, got: usize },

    /// A color mapper was configured with unusable segments.
    #[error("invalid color map: {0}")]
    InvalidColorMap(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A parameter value is outside the range an engine accepts.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// No engine is registered under the requested name.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// A background calculation ended without delivering its result.
    #[error("calculation worker disconnected before delivering a result")]
    WorkerDisconnected,

    /// An I/O failure while writing a snapshot.
    #[error("i/o error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let msg = EngineError::InvalidDimensions.to_string();
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_range_includes_bounds() {
        let msg = EngineError::InvalidRange {
            x_min: 2.5,
            x_max: -1.0,
        }
        .to_string();
        assert!(msg.contains("2.5"), "missing x_min in: {msg}");
        assert!(msg.contains("-1"), "missing x_max in: {msg}");
    }

    #[test]
    fn size_mismatch_includes_both_lengths() {
        let msg = EngineError::SizeMismatch {
            expected: 300,
            got: 299,
        }
        .to_string();
        assert!(msg.contains("300"), "missing expected in: {msg}");
        assert!(msg.contains("299"), "missing got in: {msg}");
    }

    #[test]
    fn dimension_mismatch_includes_all_dimensions() {
        let msg = EngineError::DimensionMismatch {
            lhs_w: 10,
            lhs_h: 20,
            rhs_w: 30,
            rhs_h: 40,
        }
        .to_string();
        for n in ["10", "20", "30", "40"] {
            assert!(msg.contains(n), "missing {n} in: {msg}");
        }
    }

    #[test]
    fn invalid_parameter_includes_name_and_reason() {
        let msg = EngineError::InvalidParameter {
            name: "escape_value".into(),
            reason: "must be positive".into(),
        }
        .to_string();
        assert!(msg.contains("escape_value"), "missing name in: {msg}");
        assert!(msg.contains("positive"), "missing reason in: {msg}");
    }

    #[test]
    fn unknown_engine_includes_name() {
        let msg = EngineError::UnknownEngine("lorenz".into()).to_string();
        assert!(msg.contains("lorenz"), "missing name in: {msg}");
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
