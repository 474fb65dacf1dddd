//! Error type shared by the motion core and the browser host.

/// Errors raised while configuring or binding page motion.
///
/// None of these are surfaced to the page: bindings log them and disable the
/// affected feature.
#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    #[error("Invalid motion config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Invalid root margin: {0:?}")]
    RootMargin(String),

    #[error("Counter text has no digits: {0:?}")]
    CounterText(String),

    #[error("Host call failed: {0}")]
    Host(String),
}

pub type Result<T> = std::result::Result<T, MotionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MotionError::CounterText("N/A".to_string());
        assert_eq!(err.to_string(), "Counter text has no digits: \"N/A\"");

        let err = MotionError::InvalidValue {
            field: "reveal.threshold",
            reason: "must be within 0..=1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid config value for reveal.threshold: must be within 0..=1"
        );
    }

    #[test]
    fn test_from_serde_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: MotionError = parse_err.into();
        assert!(matches!(err, MotionError::Config(_)));
        assert!(err.to_string().starts_with("Invalid motion config"));
    }
}
