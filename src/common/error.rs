//! Error types for frenet_planner

use std::fmt;

/// Main error type for the planner
#[derive(Debug)]
pub enum PlannerError {
    /// Configuration value out of range
    InvalidConfig(String),
    /// Planning input rejected (waypoints, lane bounds, start state)
    InvalidInput(String),
    /// Numerical computation failed
    NumericalError(String),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            PlannerError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            PlannerError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for PlannerError {}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlannerError::InvalidInput("need at least 3 waypoints".to_string());
        assert_eq!(format!("{}", err), "Invalid input: need at least 3 waypoints");
    }

    #[test]
    fn test_error_is_std_error() {
        let err = PlannerError::InvalidConfig("tick_t must be positive".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
