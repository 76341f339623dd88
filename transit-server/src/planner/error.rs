//! Planner error types.

use crate::domain::StationId;

/// Errors from route planning.
///
/// An unreachable destination is not an error; operations report it as an
/// empty result instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlannerError {
    /// Station id is not part of the graph being searched
    #[error("unknown station: {0}")]
    UnknownStation(StationId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PlannerError::UnknownStation(StationId::parse("TM999").unwrap());
        assert_eq!(err.to_string(), "unknown station: TM999");
    }
}
