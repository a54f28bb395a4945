//! Shared vocabulary for the tenancy and invoice state machines.

/// Raised when a `{state, event}` pair has no entry in a transition table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} cannot {event} while {state}")]
pub struct InvalidTransition {
    pub entity: &'static str,
    pub state: &'static str,
    pub event: &'static str,
}
