//! Registration workflow state machine
//!
//! IDLE → VALIDATING → NORMALIZING → GEOCODING → PERSISTING → DONE
//!
//! Error exits: VALIDATING → VALIDATION_FAILED, GEOCODING → NO_MATCH,
//! GEOCODING → GEOCODE_FAILED, PERSISTING → STORE_FAILED. Every terminal
//! state, DONE included, falls back to IDLE so the form can be submitted again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationState {
    /// Waiting for a submission
    Idle,
    /// Checking required form fields
    Validating,
    /// Stripping accents from the address line
    Normalizing,
    /// Waiting on the geocoding service
    Geocoding,
    /// Read-modify-write of the record collection
    Persisting,
    /// Record stored
    Done,
    /// Required field missing
    ValidationFailed,
    /// Geocoder returned no candidates
    NoMatch,
    /// Geocoder unreachable or failing
    GeocodeFailed,
    /// Record collection could not be read or written
    StoreFailed,
}

impl RegistrationState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RegistrationState::Done
                | RegistrationState::ValidationFailed
                | RegistrationState::NoMatch
                | RegistrationState::GeocodeFailed
                | RegistrationState::StoreFailed
        )
    }

    /// True while a submission is in flight
    pub fn is_busy(self) -> bool {
        !self.is_terminal() && self != RegistrationState::Idle
    }

    fn can_transition_to(self, next: RegistrationState) -> bool {
        use RegistrationState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Normalizing)
                | (Validating, ValidationFailed)
                | (Normalizing, Geocoding)
                | (Geocoding, Persisting)
                | (Geocoding, NoMatch)
                | (Geocoding, GeocodeFailed)
                | (Persisting, Done)
                | (Persisting, StoreFailed)
                | (Done, Idle)
                | (ValidationFailed, Idle)
                | (NoMatch, Idle)
                | (GeocodeFailed, Idle)
                | (StoreFailed, Idle)
        )
    }
}

/// State transition event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: RegistrationState,
    pub new_state: RegistrationState,
    pub transitioned_at: DateTime<Utc>,
}

/// Registration session owned by one form instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationSession {
    pub session_id: Uuid,
    pub state: RegistrationState,
    /// Every transition since the session was created
    pub history: Vec<StateTransition>,
    /// User-facing message of the last failed submission
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RegistrationSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: RegistrationState::Idle,
            history: Vec::new(),
            last_error: None,
            created_at: Utc::now(),
        }
    }

    /// Move to `new_state`
    ///
    /// # Panics
    /// On a transition the state machine does not allow. Only the workflow
    /// drives the session, so this is a programming error.
    pub fn transition_to(&mut self, new_state: RegistrationState) -> StateTransition {
        assert!(
            self.state.can_transition_to(new_state),
            "illegal registration transition {:?} -> {:?}",
            self.state,
            new_state
        );

        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;
        self.history.push(transition.clone());

        tracing::debug!(
            session_id = %self.session_id,
            from = ?transition.old_state,
            to = ?transition.new_state,
            "Registration state changed"
        );

        transition
    }

    /// States visited, in order, starting from the first one left
    pub fn visited_states(&self) -> Vec<RegistrationState> {
        self.history.iter().map(|t| t.new_state).collect()
    }
}

impl Default for RegistrationSession {
    fn default() -> Self {
        Self::new()
    }
}
