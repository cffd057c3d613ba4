//! Registration workflow
//!
//! Drives one [`RegistrationSession`] per form instance:
//! validate → normalize → geocode → append to the store → navigate back.
//!
//! Validation runs before anything touches the network. The store is written
//! at most once per submission and only with a complete, coordinate-bearing
//! record; every failure leaves it exactly as it was.

use crate::models::{RegistrationSession, RegistrationState};
use crate::services::geocoder::{GeocodeError, Geocoder};
use addrmap_common::events::{AppEvent, EventBus, View};
use addrmap_common::normalize::{compose_address_line, normalize};
use addrmap_common::{FormFields, KeyValueStore, RecordStore, StoreError, UserRecord};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Form validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field(s): {}", .0.join(", "))]
    MissingField(Vec<&'static str>),
}

/// Result of one submission
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    /// Record stored; the caller should return to the map
    Done(UserRecord),
    ValidationFailed(ValidationError),
    /// Geocoder answered with zero candidates
    NoMatch(GeocodeError),
    GeocodeFailed(GeocodeError),
    StoreFailed(StoreError),
}

impl WorkflowOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, WorkflowOutcome::Done(_))
    }

    /// Terminal state the session reached for this outcome
    pub fn state(&self) -> RegistrationState {
        match self {
            WorkflowOutcome::Done(_) => RegistrationState::Done,
            WorkflowOutcome::ValidationFailed(_) => RegistrationState::ValidationFailed,
            WorkflowOutcome::NoMatch(_) => RegistrationState::NoMatch,
            WorkflowOutcome::GeocodeFailed(_) => RegistrationState::GeocodeFailed,
            WorkflowOutcome::StoreFailed(_) => RegistrationState::StoreFailed,
        }
    }

    /// Message to show under the form
    pub fn user_message(&self) -> String {
        match self {
            WorkflowOutcome::Done(record) => format!("Registered {}", record.name),
            WorkflowOutcome::ValidationFailed(e) => format!("Please fill in: {}", match e {
                ValidationError::MissingField(fields) => fields.join(", "),
            }),
            WorkflowOutcome::NoMatch(_) => "Could not find the address.".to_string(),
            WorkflowOutcome::GeocodeFailed(_) | WorkflowOutcome::StoreFailed(_) => {
                "Failed to register the user. Please try again.".to_string()
            }
        }
    }
}

/// Registration workflow for one form instance
///
/// `submit` takes `&mut self`, so a form cannot start a second submission
/// while one is in flight.
pub struct RegistrationWorkflow<S> {
    session: RegistrationSession,
    geocoder: Arc<dyn Geocoder>,
    store: RecordStore<S>,
    event_bus: Option<EventBus>,
}

impl<S: KeyValueStore> RegistrationWorkflow<S> {
    pub fn new(geocoder: Arc<dyn Geocoder>, store: RecordStore<S>) -> Self {
        Self {
            session: RegistrationSession::new(),
            geocoder,
            store,
            event_bus: None,
        }
    }

    /// Publish registration and navigate-back events on `bus`
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn session(&self) -> &RegistrationSession {
        &self.session
    }

    /// Run one submission to completion
    ///
    /// The session always ends back in `Idle`; `last_error` holds the
    /// user-facing message of a failed run and is cleared by a successful one.
    pub async fn submit(&mut self, form: &FormFields) -> WorkflowOutcome {
        let outcome = self.run(form).await;

        self.session.last_error = if outcome.is_done() {
            None
        } else {
            Some(outcome.user_message())
        };
        self.session.transition_to(RegistrationState::Idle);

        if let WorkflowOutcome::Done(record) = &outcome {
            if let Some(bus) = &self.event_bus {
                bus.emit_lossy(AppEvent::RecordRegistered {
                    name: record.name.clone(),
                    latitude: record.latitude,
                    longitude: record.longitude,
                    timestamp: Utc::now(),
                });
                bus.emit_lossy(AppEvent::navigate_back(View::Register));
            }
        }

        outcome
    }

    async fn run(&mut self, form: &FormFields) -> WorkflowOutcome {
        let session_id = self.session.session_id;

        self.session.transition_to(RegistrationState::Validating);
        let missing = form.missing_required();
        if !missing.is_empty() {
            warn!(session_id = %session_id, missing = ?missing, "Registration rejected");
            self.session.transition_to(RegistrationState::ValidationFailed);
            return WorkflowOutcome::ValidationFailed(ValidationError::MissingField(missing));
        }

        self.session.transition_to(RegistrationState::Normalizing);
        let address_line = normalize(&compose_address_line(&form.street, &form.city, &form.state));

        self.session.transition_to(RegistrationState::Geocoding);
        let candidates = match self.geocoder.geocode(&address_line).await {
            Ok(candidates) => candidates,
            Err(GeocodeError::NoMatch(line)) => {
                self.session.transition_to(RegistrationState::NoMatch);
                return WorkflowOutcome::NoMatch(GeocodeError::NoMatch(line));
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Geocoding failed");
                self.session.transition_to(RegistrationState::GeocodeFailed);
                return WorkflowOutcome::GeocodeFailed(e);
            }
        };

        let Some(best) = candidates.first().copied() else {
            info!(session_id = %session_id, address = %address_line, "No geocoding match");
            self.session.transition_to(RegistrationState::NoMatch);
            return WorkflowOutcome::NoMatch(GeocodeError::NoMatch(address_line));
        };

        self.session.transition_to(RegistrationState::Persisting);
        let record = UserRecord::from_form(form, best);

        // A corrupt collection must not be replaced by [record]
        let mut records = match self.store.load().await {
            Ok(records) => records,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Could not read records");
                self.session.transition_to(RegistrationState::StoreFailed);
                return WorkflowOutcome::StoreFailed(e);
            }
        };
        records.push(record.clone());

        if let Err(e) = self.store.save(&records).await {
            warn!(session_id = %session_id, error = %e, "Could not save records");
            self.session.transition_to(RegistrationState::StoreFailed);
            return WorkflowOutcome::StoreFailed(e);
        }

        self.session.transition_to(RegistrationState::Done);
        info!(
            session_id = %session_id,
            name = %record.name,
            latitude = record.latitude,
            longitude = record.longitude,
            total = records.len(),
            "Record registered"
        );

        WorkflowOutcome::Done(record)
    }
}
