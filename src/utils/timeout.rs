//! Timeout validation for session lifecycle stages

use std::time::Duration;

use super::errors::SetupError;

/// Maximum timeout for launch and navigation (5 minutes)
/// Covers cold Chrome starts, slow-loading sites and heavy SPAs
pub const MAX_NAVIGATION_TIMEOUT_MS: u64 = 300_000;

/// Maximum timeout for document reads and session close (30 seconds)
pub const MAX_INTERACTION_TIMEOUT_MS: u64 = 30_000;

/// Validate a launch or navigation stage timeout
///
/// # Example
/// ```rust
/// use kodegen_tools_sitemeta::utils::validate_navigation_timeout;
///
/// let timeout = validate_navigation_timeout("navigation_ms", 45_000).unwrap();
/// assert_eq!(timeout.as_secs(), 45);
/// ```
pub fn validate_navigation_timeout(name: &str, ms: u64) -> Result<Duration, SetupError> {
    validate(name, ms, MAX_NAVIGATION_TIMEOUT_MS)
}

/// Validate a read or close stage timeout
pub fn validate_interaction_timeout(name: &str, ms: u64) -> Result<Duration, SetupError> {
    validate(name, ms, MAX_INTERACTION_TIMEOUT_MS)
}

fn validate(name: &str, ms: u64, max_ms: u64) -> Result<Duration, SetupError> {
    if ms == 0 {
        return Err(SetupError::InvalidConfig(format!(
            "{name} must be greater than 0"
        )));
    }

    if ms > max_ms {
        return Err(SetupError::InvalidConfig(format!(
            "{name} cannot exceed {max_ms}ms ({:.1} minutes). Received: {ms}ms ({:.1} minutes)",
            max_ms as f64 / 60_000.0,
            ms as f64 / 60_000.0
        )));
    }

    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_values_within_bounds() {
        assert_eq!(
            validate_interaction_timeout("read_ms", 1_500).unwrap(),
            Duration::from_millis(1_500)
        );
        assert!(validate_navigation_timeout("navigation_ms", MAX_NAVIGATION_TIMEOUT_MS).is_ok());
    }

    #[test]
    fn rejects_zero_and_oversized() {
        assert!(matches!(
            validate_navigation_timeout("launch_ms", 0),
            Err(SetupError::InvalidConfig(_))
        ));
        let err = validate_interaction_timeout("read_ms", 60_000).unwrap_err();
        assert!(err.to_string().contains("read_ms cannot exceed 30000ms"));
    }
}
