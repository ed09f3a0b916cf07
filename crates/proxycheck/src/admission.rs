//! Admission gate in front of downstream consumers.
//!
//! A candidate configuration is validated before it is accepted for a
//! consumer. Any violation rejects the whole candidate; the consumer keeps
//! whatever it accepted last. Accepted versions must strictly increase per
//! consumer.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use proxycheck_validate::Validate;
use proxycheck_validate::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum Rejection {
    #[error("version {version} for {consumer} failed validation: {source}")]
    Invalid {
        consumer: String,
        version: u64,
        #[source]
        source: ValidationError,
    },

    #[error("version {version} for {consumer} is not newer than accepted version {current}")]
    Stale {
        consumer: String,
        version: u64,
        current: u64,
    },
}

impl Rejection {
    /// The validation failure behind this rejection, if there was one.
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            Rejection::Invalid { source, .. } => Some(source),
            Rejection::Stale { .. } => None,
        }
    }
}

/// Lifecycle hooks invoked by an [`AdmissionGate`].
///
/// Hooks observe; they cannot veto a decision.
pub trait Callbacks {
    fn on_submit(&self, _consumer: &str, _version: u64) {}
    fn on_accept(&self, _consumer: &str, _version: u64) {}
    fn on_reject(&self, _rejection: &Rejection) {}
}

/// Callbacks that log every event and keep running totals.
#[derive(Debug, Default)]
pub struct LoggingCallbacks {
    submitted: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
}

impl LoggingCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self) -> Report {
        Report {
            submitted: self.submitted.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

impl Callbacks for LoggingCallbacks {
    fn on_submit(&self, consumer: &str, version: u64) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("[{}] candidate version {} submitted", consumer, version);
    }

    fn on_accept(&self, consumer: &str, version: u64) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        tracing::info!("[{}] accepted version {}", consumer, version);
    }

    fn on_reject(&self, rejection: &Rejection) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("{}", rejection);
        if let Some(error) = rejection.validation_error() {
            tracing::debug!("failing field: {} ({})", error.path(), error.root_cause().kind());
        }
    }
}

/// Event totals from [`LoggingCallbacks`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    pub submitted: u64,
    pub accepted: u64,
    pub rejected: u64,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "admission submitted={} accepted={} rejected={}",
            self.submitted, self.accepted, self.rejected
        )
    }
}

/// The last candidate accepted for a consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted<T> {
    pub version: u64,
    pub config: T,
}

pub struct AdmissionGate<T, C = LoggingCallbacks> {
    accepted: HashMap<String, Accepted<T>>,
    callbacks: C,
}

impl<T: Validate> AdmissionGate<T, LoggingCallbacks> {
    pub fn new() -> Self {
        Self::with_callbacks(LoggingCallbacks::new())
    }
}

impl<T: Validate> Default for AdmissionGate<T, LoggingCallbacks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Validate, C: Callbacks> AdmissionGate<T, C> {
    pub fn with_callbacks(callbacks: C) -> Self {
        Self {
            accepted: HashMap::new(),
            callbacks,
        }
    }

    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    /// Validate `candidate` and, if it passes, make it the consumer's
    /// current configuration.
    pub fn submit(&mut self, consumer: &str, version: u64, candidate: T) -> Result<(), Rejection> {
        self.callbacks.on_submit(consumer, version);

        let result = self.check(consumer, version, &candidate);
        match result {
            Ok(()) => {
                self.accepted.insert(
                    consumer.to_string(),
                    Accepted {
                        version,
                        config: candidate,
                    },
                );
                self.callbacks.on_accept(consumer, version);
                Ok(())
            }
            Err(rejection) => {
                self.callbacks.on_reject(&rejection);
                Err(rejection)
            }
        }
    }

    fn check(&self, consumer: &str, version: u64, candidate: &T) -> Result<(), Rejection> {
        if let Some(current) = self.accepted.get(consumer) {
            if version <= current.version {
                return Err(Rejection::Stale {
                    consumer: consumer.to_string(),
                    version,
                    current: current.version,
                });
            }
        }

        candidate.validate().map_err(|source| Rejection::Invalid {
            consumer: consumer.to_string(),
            version,
            source,
        })
    }

    pub fn current(&self, consumer: &str) -> Option<&Accepted<T>> {
        self.accepted.get(consumer)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::schema::OAuth2;
    use crate::schema::OAuth2Config;

    fn invalid() -> OAuth2 {
        OAuth2 {
            config: Some(OAuth2Config::default()),
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl Callbacks for Recorder {
        fn on_submit(&self, consumer: &str, version: u64) {
            self.events
                .borrow_mut()
                .push(format!("submit {} {}", consumer, version));
        }

        fn on_accept(&self, consumer: &str, version: u64) {
            self.events
                .borrow_mut()
                .push(format!("accept {} {}", consumer, version));
        }

        fn on_reject(&self, rejection: &Rejection) {
            self.events.borrow_mut().push(format!("reject {}", rejection));
        }
    }

    #[test]
    fn test_accepts_valid_candidate() {
        let mut gate = AdmissionGate::new();
        gate.submit("edge", 1, OAuth2::default()).unwrap();

        assert_eq!(gate.current("edge").map(|a| a.version), Some(1));
        assert!(gate.current("other").is_none());
        assert_eq!(
            gate.callbacks().report(),
            Report {
                submitted: 1,
                accepted: 1,
                rejected: 0,
            }
        );
    }

    #[test]
    fn test_rejects_invalid_and_keeps_previous() {
        let mut gate = AdmissionGate::new();
        gate.submit("edge", 1, OAuth2::default()).unwrap();

        let rejection = gate.submit("edge", 2, invalid()).unwrap_err();
        let error = rejection.validation_error().unwrap();
        assert_eq!(error.path(), "OAuth2.Config.AuthorizationEndpoint");
        insta::assert_snapshot!(
            rejection.to_string(),
            @"version 2 for edge failed validation: invalid OAuth2.Config: embedded message failed validation | caused by: invalid OAuth2Config.AuthorizationEndpoint: value length must be at least 1 runes"
        );

        assert_eq!(gate.current("edge").map(|a| a.version), Some(1));
        assert_eq!(
            gate.callbacks().report().to_string(),
            "admission submitted=2 accepted=1 rejected=1"
        );
    }

    #[test]
    fn test_rejects_stale_version() {
        let mut gate = AdmissionGate::with_callbacks(Recorder::default());
        gate.submit("edge", 3, OAuth2::default()).unwrap();

        let rejection = gate.submit("edge", 3, OAuth2::default()).unwrap_err();
        assert!(matches!(rejection, Rejection::Stale { current: 3, .. }));
        assert!(rejection.validation_error().is_none());

        // Versions are tracked per consumer
        gate.submit("internal", 1, OAuth2::default()).unwrap();

        insta::assert_debug_snapshot!(gate.callbacks().events.borrow(), @r#"
        [
            "submit edge 3",
            "accept edge 3",
            "submit edge 3",
            "reject version 3 for edge is not newer than accepted version 3",
            "submit internal 1",
            "accept internal 1",
        ]
        "#);
    }
}
