//! Tenancy transition table. Handlers never assign a status directly; they apply an event.

use crate::lifecycle::InvalidTransition;

use super::domain::TenancyStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenancyEvent {
    Accept,
    Reject,
    Remove,
    Expire,
}

impl TenancyEvent {
    pub const fn label(self) -> &'static str {
        match self {
            TenancyEvent::Accept => "accept",
            TenancyEvent::Reject => "reject",
            TenancyEvent::Remove => "remove",
            TenancyEvent::Expire => "expire",
        }
    }
}

/// Result of applying an event: a new status, or deletion of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenancyOutcome {
    Becomes(TenancyStatus),
    Removed,
}

const TRANSITIONS: &[(TenancyStatus, TenancyEvent, TenancyOutcome)] = &[
    (
        TenancyStatus::Pending,
        TenancyEvent::Accept,
        TenancyOutcome::Becomes(TenancyStatus::Active),
    ),
    (
        TenancyStatus::Pending,
        TenancyEvent::Reject,
        TenancyOutcome::Removed,
    ),
    (
        TenancyStatus::Pending,
        TenancyEvent::Remove,
        TenancyOutcome::Removed,
    ),
    (
        TenancyStatus::Active,
        TenancyEvent::Remove,
        TenancyOutcome::Removed,
    ),
    (
        TenancyStatus::Active,
        TenancyEvent::Expire,
        TenancyOutcome::Becomes(TenancyStatus::Past),
    ),
    (TenancyStatus::Past, TenancyEvent::Remove, TenancyOutcome::Removed),
];

pub fn transition(
    state: TenancyStatus,
    event: TenancyEvent,
) -> Result<TenancyOutcome, InvalidTransition> {
    TRANSITIONS
        .iter()
        .find(|(from, on, _)| *from == state && *on == event)
        .map(|(_, _, outcome)| *outcome)
        .ok_or(InvalidTransition {
            entity: "tenancy",
            state: state.label(),
            event: event.label(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_is_the_only_path_to_active() {
        for state in [
            TenancyStatus::Pending,
            TenancyStatus::Active,
            TenancyStatus::Past,
        ] {
            for event in [
                TenancyEvent::Accept,
                TenancyEvent::Reject,
                TenancyEvent::Remove,
                TenancyEvent::Expire,
            ] {
                if let Ok(TenancyOutcome::Becomes(TenancyStatus::Active)) = transition(state, event)
                {
                    assert_eq!((state, event), (TenancyStatus::Pending, TenancyEvent::Accept));
                }
            }
        }
    }

    #[test]
    fn responses_require_pending() {
        for state in [TenancyStatus::Active, TenancyStatus::Past] {
            for event in [TenancyEvent::Accept, TenancyEvent::Reject] {
                let err = transition(state, event).expect_err("not pending");
                assert_eq!(err.state, state.label());
            }
        }
    }

    #[test]
    fn removal_allowed_from_every_state() {
        for state in [
            TenancyStatus::Pending,
            TenancyStatus::Active,
            TenancyStatus::Past,
        ] {
            assert_eq!(
                transition(state, TenancyEvent::Remove),
                Ok(TenancyOutcome::Removed)
            );
        }
    }

    #[test]
    fn only_active_leases_expire() {
        assert_eq!(
            transition(TenancyStatus::Active, TenancyEvent::Expire),
            Ok(TenancyOutcome::Becomes(TenancyStatus::Past))
        );
        assert!(transition(TenancyStatus::Pending, TenancyEvent::Expire).is_err());
        assert!(transition(TenancyStatus::Past, TenancyEvent::Expire).is_err());
    }

    #[test]
    fn rejection_message_names_state_and_event() {
        let err = transition(TenancyStatus::Active, TenancyEvent::Accept).expect_err("rejected");
        assert_eq!(err.to_string(), "tenancy cannot accept while Active");
    }
}
