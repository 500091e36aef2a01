//! Hub service: use-cases for managing sensor hubs.

use labhub_domain::ability::{self, Action, Resource};
use labhub_domain::error::{LabHubError, NotFoundError};
use labhub_domain::hub::{Hub, HubParams};
use labhub_domain::id::HubId;
use labhub_domain::user::User;

use crate::ports::HubRepository;

/// Application service for hub CRUD operations.
pub struct HubService<H> {
    repo: H,
}

impl<H: HubRepository> HubService<H> {
    pub fn new(repo: H) -> Self {
        Self { repo }
    }

    /// Hubs visible to `actor`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_hubs(&self, actor: &User) -> Result<Vec<Hub>, LabHubError> {
        if actor.admin {
            self.repo.get_all().await
        } else {
            self.repo.find_by_owner(actor.id).await
        }
    }

    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`], [`LabHubError::Forbidden`], or a
    /// storage error from the repository.
    pub async fn get_hub(&self, actor: &User, id: HubId) -> Result<Hub, LabHubError> {
        let hub = self.load(id).await?;
        ability::authorize(actor, Action::Read, Resource::Hub(&hub))?;
        Ok(hub)
    }

    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, actor, params), fields(actor = %actor.id))]
    pub async fn create_hub(&self, actor: &User, params: HubParams) -> Result<Hub, LabHubError> {
        let hub = Hub::builder().params(params).owner_id(actor.id).build()?;
        ability::authorize(actor, Action::Create, Resource::Hub(&hub))?;
        self.repo.create(hub).await
    }

    /// Delete a hub together with its sensors and their readings.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`], [`LabHubError::Forbidden`], or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn delete_hub(&self, actor: &User, id: HubId) -> Result<(), LabHubError> {
        let hub = self.load(id).await?;
        ability::authorize(actor, Action::Destroy, Resource::Hub(&hub))?;
        self.repo.delete(id).await
    }

    async fn load(&self, id: HubId) -> Result<Hub, LabHubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Hub",
                id: id.to_string(),
            }
            .into()
        })
    }
}
