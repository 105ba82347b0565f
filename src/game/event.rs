//! Presentation events. The engine queues them; whoever renders the net
//! drains the queue after each operation.
use serde::Serialize;

use crate::game::fire::TokenChange;
use crate::net::TransitionId;

/// How a transition should be shown while a step is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StepMark {
    /// Included in the step.
    Chosen,
    /// Inclusion was refused, the unclaimed tokens do not cover it.
    Unavailable,
    /// Left the step and is enabled under the real marking.
    Enabled,
    /// Left the step and is not enabled under the real marking.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    TokensChanged(TokenChange),
    EnablingChanged {
        transition: TransitionId,
        enabled: bool,
    },
    StepMarked {
        transition: TransitionId,
        mark: StepMark,
    },
    /// The step session ended, by commit or abandonment.
    StepCleared,
}
