//! Checkout lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where a single checkout attempt currently is.
///
/// `Idle -> Charging -> Settling -> Done`, with `Failed` reachable from
/// every non-terminal state. `Idle -> Settling` resumes a charge that was
/// accepted earlier but never settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    Idle,
    Charging,
    Settling,
    Done,
    Failed,
}

impl Default for CheckoutState {
    fn default() -> Self {
        CheckoutState::Idle
    }
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::Charging => "charging",
            CheckoutState::Settling => "settling",
            CheckoutState::Done => "done",
            CheckoutState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl StateMachine for CheckoutState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CheckoutState::*;
        matches!(
            (self, target),
            (Idle, Charging)
                | (Idle, Settling)
                | (Charging, Settling)
                | (Settling, Done)
                | (Idle, Failed)
                | (Charging, Failed)
                | (Settling, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CheckoutState::*;
        match self {
            Idle => vec![Charging, Settling, Failed],
            Charging => vec![Settling, Failed],
            Settling => vec![Done, Failed],
            Done | Failed => vec![],
        }
    }
}
