//! Saga status state machine.

use serde::{Deserialize, Serialize};

/// The status a saga event carries between participants.
///
/// Transitions, driven entirely by the routing function:
/// ```text
/// SUCCESS ──► SUCCESS            (next forward participant succeeded)
/// SUCCESS ──► ROLLBACK_PENDING   (a participant's own step failed)
/// ROLLBACK_PENDING ──► FAIL      (that participant compensated itself)
/// FAIL ──► FAIL                  (earlier participants keep compensating)
/// ```
///
/// `SUCCESS` at the final participant and `FAIL` at the initiator are
/// terminal for the saga as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SagaStatus {
    /// The last step executed succeeded; the saga moves forward.
    #[default]
    Success,

    /// A step failed and its own compensation has not run yet.
    RollbackPending,

    /// The saga is unwinding; compensations run backward.
    Fail,
}

impl SagaStatus {
    /// Returns true if the event moves forward through the participants.
    pub fn is_forward(&self) -> bool {
        matches!(self, SagaStatus::Success)
    }

    /// Returns true if the event is part of the rollback run.
    pub fn is_rollback(&self) -> bool {
        matches!(self, SagaStatus::RollbackPending | SagaStatus::Fail)
    }

    /// Returns the status name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaStatus::Success => "SUCCESS",
            SagaStatus::RollbackPending => "ROLLBACK_PENDING",
            SagaStatus::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for SagaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_success() {
        assert_eq!(SagaStatus::default(), SagaStatus::Success);
    }

    #[test]
    fn test_direction() {
        assert!(SagaStatus::Success.is_forward());
        assert!(!SagaStatus::Success.is_rollback());
        assert!(SagaStatus::RollbackPending.is_rollback());
        assert!(SagaStatus::Fail.is_rollback());
        assert!(!SagaStatus::Fail.is_forward());
    }

    #[test]
    fn test_display() {
        assert_eq!(SagaStatus::Success.to_string(), "SUCCESS");
        assert_eq!(SagaStatus::RollbackPending.to_string(), "ROLLBACK_PENDING");
        assert_eq!(SagaStatus::Fail.to_string(), "FAIL");
    }

    #[test]
    fn test_wire_form_is_screaming_snake_case() {
        let json = serde_json::to_string(&SagaStatus::RollbackPending).unwrap();
        assert_eq!(json, "\"ROLLBACK_PENDING\"");
        let back: SagaStatus = serde_json::from_str("\"FAIL\"").unwrap();
        assert_eq!(back, SagaStatus::Fail);
    }
}
