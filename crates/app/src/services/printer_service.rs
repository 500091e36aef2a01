//! Printer service: use-cases for managing printers.

use labhub_domain::ability::{self, Action, Resource};
use labhub_domain::error::{LabHubError, NotFoundError};
use labhub_domain::id::PrinterId;
use labhub_domain::printer::{Printer, PrinterParams};
use labhub_domain::user::User;

use crate::ports::PrinterRepository;

/// Application service for printer CRUD operations.
pub struct PrinterService<P> {
    repo: P,
}

impl<P: PrinterRepository> PrinterService<P> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: P) -> Self {
        Self { repo }
    }

    /// Printers visible to `actor`: all of them for admins, owned ones otherwise.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_printers(&self, actor: &User) -> Result<Vec<Printer>, LabHubError> {
        if actor.admin {
            self.repo.get_all().await
        } else {
            self.repo.find_by_owner(actor.id).await
        }
    }

    /// Look up a printer by id.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] when no printer with `id` exists,
    /// [`LabHubError::Forbidden`] when `actor` may not read it, or a storage
    /// error from the repository.
    pub async fn get_printer(&self, actor: &User, id: PrinterId) -> Result<Printer, LabHubError> {
        let printer = self.load(id).await?;
        ability::authorize(actor, Action::Read, Resource::Printer(&printer))?;
        Ok(printer)
    }

    /// Register a printer owned by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, actor, params), fields(actor = %actor.id))]
    pub async fn create_printer(
        &self,
        actor: &User,
        params: PrinterParams,
    ) -> Result<Printer, LabHubError> {
        let printer = Printer::builder().params(params).owner_id(actor.id).build()?;
        ability::authorize(actor, Action::Create, Resource::Printer(&printer))?;
        self.repo.create(printer).await
    }

    /// Delete a printer and its jobs.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`], [`LabHubError::Forbidden`], or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn delete_printer(&self, actor: &User, id: PrinterId) -> Result<(), LabHubError> {
        let printer = self.load(id).await?;
        ability::authorize(actor, Action::Destroy, Resource::Printer(&printer))?;
        self.repo.delete(id).await
    }

    async fn load(&self, id: PrinterId) -> Result<Printer, LabHubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Printer",
                id: id.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryPrinterRepo, admin, member};

    fn make_service() -> PrinterService<InMemoryPrinterRepo> {
        PrinterService::new(InMemoryPrinterRepo::default())
    }

    fn params(name: &str) -> PrinterParams {
        PrinterParams {
            name: Some(name.into()),
            model: Some("Prusa MK4".into()),
        }
    }

    #[tokio::test]
    async fn should_create_printer_owned_by_actor() {
        let svc = make_service();
        let bob = member("Bob");

        let printer = svc.create_printer(&bob, params("Bench")).await.unwrap();

        assert_eq!(printer.owner_id, bob.id);
        assert_eq!(svc.get_printer(&bob, printer.id).await.unwrap(), printer);
    }

    #[tokio::test]
    async fn should_return_validation_error_when_name_blank() {
        let svc = make_service();

        let result = svc.create_printer(&member("Bob"), params("  ")).await;

        assert!(matches!(result, Err(LabHubError::Validation(_))));
        assert!(svc.list_printers(&admin()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_list_only_owned_printers_for_members() {
        let svc = make_service();
        let bob = member("Bob");
        let eve = member("Eve");
        svc.create_printer(&bob, params("Bob's")).await.unwrap();
        svc.create_printer(&eve, params("Eve's")).await.unwrap();

        let listed = svc.list_printers(&bob).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Bob's");
        assert_eq!(svc.list_printers(&admin()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_forbid_reading_foreign_printer() {
        let svc = make_service();
        let printer = svc
            .create_printer(&member("Bob"), params("Bench"))
            .await
            .unwrap();

        let result = svc.get_printer(&member("Eve"), printer.id).await;

        assert!(matches!(result, Err(LabHubError::Forbidden(_))));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_printer() {
        let svc = make_service();

        let result = svc.delete_printer(&admin(), PrinterId::new()).await;

        assert!(matches!(result, Err(LabHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_delete_printer_as_admin() {
        let svc = make_service();
        let printer = svc
            .create_printer(&member("Bob"), params("Bench"))
            .await
            .unwrap();

        svc.delete_printer(&admin(), printer.id).await.unwrap();

        assert!(matches!(
            svc.get_printer(&admin(), printer.id).await,
            Err(LabHubError::NotFound(_))
        ));
    }
}
