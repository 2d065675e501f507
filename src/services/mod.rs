//! Business logic services

pub mod circulation;
pub mod libraries;
pub mod policies;
pub mod queues;
pub mod verification;

use crate::remote::RemoteApi;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    remote: RemoteApi,
    pub circulation: circulation::CirculationService,
    pub policies: policies::PolicyService,
    pub libraries: libraries::LibraryService,
}

impl Services {
    /// Create all services with the given remote API
    pub fn new(remote: RemoteApi) -> Self {
        Self {
            circulation: circulation::CirculationService::new(remote.clone()),
            policies: policies::PolicyService::new(remote.clone()),
            libraries: libraries::LibraryService::new(remote.clone()),
            remote,
        }
    }

    /// Build a queue aggregator. Queue state is scoped to a screen's
    /// lifetime, so each screen constructs its own.
    pub fn queues(&self) -> queues::QueueService {
        queues::QueueService::new(self.remote.clone())
    }
}
