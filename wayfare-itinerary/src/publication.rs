use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use wayfare_core::repository::PublicationRepository;
use wayfare_shared::{PublicationState, PublicationStatus};

#[derive(Debug, thiserror::Error)]
pub enum PublicationError {
    #[error("A comment is required to publish a trip")]
    EmptyComment,

    #[error("Trip {0} is already published")]
    AlreadyPublished(Uuid),

    #[error("Trip {0} is not published")]
    NotPublished(Uuid),

    #[error("Publication service error: {0}")]
    Remote(String),
}

/// Private/Published state of one trip as seen by one viewer.
///
/// The held status is always the last one fetched from the repository: every
/// transition is one remote call followed by a re-fetch, and misuse
/// (`AlreadyPublished`, `NotPublished`, `EmptyComment`) leaves it untouched.
pub struct PublicationMachine {
    repo: Arc<dyn PublicationRepository>,
    viewer_id: String,
    status: PublicationStatus,
}

impl PublicationMachine {
    pub async fn load(
        repo: Arc<dyn PublicationRepository>,
        trip_id: Uuid,
        viewer_id: &str,
    ) -> Result<Self, PublicationError> {
        let status = repo
            .get_status(trip_id, viewer_id)
            .await
            .map_err(|e| PublicationError::Remote(e.to_string()))?;
        Ok(Self {
            repo,
            viewer_id: viewer_id.to_string(),
            status,
        })
    }

    pub fn trip_id(&self) -> Uuid {
        self.status.trip_id
    }

    pub fn state(&self) -> PublicationState {
        self.status.state()
    }

    pub fn status(&self) -> &PublicationStatus {
        &self.status
    }

    pub fn into_status(self) -> PublicationStatus {
        self.status
    }

    /// Private → Published
    pub async fn publish(&mut self, comment: &str) -> Result<&PublicationStatus, PublicationError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(PublicationError::EmptyComment);
        }
        if self.status.is_published() {
            return Err(PublicationError::AlreadyPublished(self.trip_id()));
        }

        let outcome = self.repo.publish(self.trip_id(), &self.viewer_id, comment).await;
        self.settle("publish", outcome.map(|_| ())).await
    }

    /// Published → Private
    pub async fn unpublish(&mut self) -> Result<&PublicationStatus, PublicationError> {
        if !self.status.is_published() {
            return Err(PublicationError::NotPublished(self.trip_id()));
        }

        let outcome = self.repo.unpublish(self.trip_id()).await;
        self.settle("unpublish", outcome).await
    }

    /// Like if the viewer has not liked the record yet, unlike otherwise
    pub async fn toggle_like(&mut self) -> Result<&PublicationStatus, PublicationError> {
        let Some(record_id) = self.status.record.as_ref().map(|r| r.id) else {
            return Err(PublicationError::NotPublished(self.trip_id()));
        };

        let outcome = if self.status.viewer_has_liked {
            self.repo.unlike(record_id, &self.viewer_id).await
        } else {
            self.repo.like(record_id, &self.viewer_id).await
        };
        self.settle("like", outcome).await
    }

    pub async fn refresh(&mut self) -> Result<&PublicationStatus, PublicationError> {
        self.status = self
            .repo
            .get_status(self.trip_id(), &self.viewer_id)
            .await
            .map_err(|e| PublicationError::Remote(e.to_string()))?;
        Ok(&self.status)
    }

    // Re-fetch after the remote call whatever its result, since the server may
    // have changed state anyway.
    async fn settle(
        &mut self,
        action: &str,
        outcome: Result<(), wayfare_core::repository::RepoError>,
    ) -> Result<&PublicationStatus, PublicationError> {
        let trip_id = self.trip_id();
        match outcome {
            Ok(()) => {
                info!("Trip {} {} by {}", trip_id, action, self.viewer_id);
                self.refresh().await
            }
            Err(e) => {
                warn!("Trip {} {} failed: {}", trip_id, action, e);
                let published = match self.refresh().await {
                    Ok(status) => Some(status.is_published()),
                    Err(refresh_err) => {
                        warn!("Trip {} status refresh failed: {}", trip_id, refresh_err);
                        None
                    }
                };
                // Another client already made the same transition
                match (action, published) {
                    ("publish", Some(true)) => Err(PublicationError::AlreadyPublished(trip_id)),
                    ("unpublish", Some(false)) => Err(PublicationError::NotPublished(trip_id)),
                    _ => Err(PublicationError::Remote(e.to_string())),
                }
            }
        }
    }
}
