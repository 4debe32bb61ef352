// ── Admin gate ──
//
// Decides whether admin-only actions are offered. Every identity change
// starts a new generation; an admin-check response from an older
// generation is discarded. Failures resolve to non-admin.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::Identity;

/// Observable gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GateState {
    Checking,
    Unauthenticated,
    AuthenticatedNonAdmin,
    AuthenticatedAdmin,
}

impl GateState {
    pub fn is_admin(self) -> bool {
        self == Self::AuthenticatedAdmin
    }

    pub fn is_settled(self) -> bool {
        self != Self::Checking
    }
}

/// Inputs to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    IdentityChanged { authenticated: bool },
    /// Outcome of the admin check issued under `generation`. `None` means
    /// the check failed.
    AdminCheckResolved {
        generation: u64,
        is_admin: Option<bool>,
    },
}

/// The gate's state plus the generation of the identity it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateMachine {
    pub state: GateState,
    pub generation: u64,
}

impl Default for GateMachine {
    fn default() -> Self {
        Self {
            state: GateState::Checking,
            generation: 0,
        }
    }
}

impl GateMachine {
    /// The single transition function.
    pub fn transition(self, event: GateEvent) -> Self {
        match event {
            GateEvent::IdentityChanged { authenticated } => Self {
                state: if authenticated {
                    GateState::Checking
                } else {
                    GateState::Unauthenticated
                },
                generation: self.generation + 1,
            },
            GateEvent::AdminCheckResolved {
                generation,
                is_admin,
            } => {
                if generation != self.generation || self.state != GateState::Checking {
                    return self;
                }
                let state = match is_admin {
                    Some(true) => GateState::AuthenticatedAdmin,
                    Some(false) | None => GateState::AuthenticatedNonAdmin,
                };
                Self { state, ..self }
            }
        }
    }
}

// ── AdminGate ────────────────────────────────────────────────────────

/// Drives a [`GateMachine`] and publishes its state.
pub struct AdminGate {
    machine: Mutex<GateMachine>,
    state: watch::Sender<GateState>,
}

impl Default for AdminGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminGate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(GateState::Checking);
        Self {
            machine: Mutex::new(GateMachine::default()),
            state,
        }
    }

    /// Apply `event` and publish the resulting state.
    pub fn apply(&self, event: GateEvent) -> GateMachine {
        let next = {
            let mut machine = self.machine.lock().unwrap_or_else(PoisonError::into_inner);
            let next = machine.transition(event);
            *machine = next;
            next
        };
        self.state.send_if_modified(|current| {
            if *current == next.state {
                false
            } else {
                debug!(from = %current, to = %next.state, "admin gate transition");
                *current = next.state;
                true
            }
        });
        next
    }

    /// Record an identity change. Returns the generation an admin check
    /// must quote, or `None` when there is nothing to check.
    pub fn begin(&self, authenticated: bool) -> Option<u64> {
        let machine = self.apply(GateEvent::IdentityChanged { authenticated });
        authenticated.then_some(machine.generation)
    }

    /// Settle the admin check issued under `generation`.
    pub fn resolve(&self, generation: u64, outcome: Result<bool, CoreError>) -> GateState {
        let is_admin = match outcome {
            Ok(flag) => Some(flag),
            Err(e) => {
                warn!(error = %e, "admin check failed; treating caller as non-admin");
                None
            }
        };
        self.apply(GateEvent::AdminCheckResolved {
            generation,
            is_admin,
        })
        .state
    }

    /// Re-evaluate for `identity`, running `check` when there is one.
    pub async fn evaluate<F, Fut>(&self, identity: Option<&Identity>, check: F) -> GateState
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<bool, CoreError>>,
    {
        let Some(generation) = self.begin(identity.is_some()) else {
            return self.state();
        };
        let outcome = check().await;
        self.resolve(generation, outcome)
    }

    pub fn state(&self) -> GateState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.state.subscribe()
    }
}
