//! Job service: print jobs, their status alerts and model files.

use labhub_domain::ability::{self, Action, Resource};
use labhub_domain::alert::Alert;
use labhub_domain::error::{LabHubError, NotFoundError, ValidationError, messages};
use labhub_domain::id::{JobId, PrinterId};
use labhub_domain::job::{Job, JobParams, STATUS_CREATED, STATUS_PROCESSING};
use labhub_domain::printer::Printer;
use labhub_domain::task::Task;
use labhub_domain::time::now;
use labhub_domain::user::User;

use super::dispatch_detached;
use crate::ports::{AlertRepository, JobRepository, ModelFileStore, PrinterRepository, TaskDispatcher};

/// Application service for jobs running on printers.
///
/// Every write is authorized through the job's parent printer. Status
/// changes never touch the alert log directly; they are dispatched as
/// [`Task::CreateAlert`] and recorded by the worker.
pub struct JobService<P, J, A, D, F> {
    printers: P,
    jobs: J,
    alerts: A,
    dispatcher: D,
    models: F,
}

impl<P, J, A, D, F> JobService<P, J, A, D, F>
where
    P: PrinterRepository,
    J: JobRepository,
    A: AlertRepository,
    D: TaskDispatcher,
    F: ModelFileStore,
{
    pub fn new(printers: P, jobs: J, alerts: A, dispatcher: D, models: F) -> Self {
        Self {
            printers,
            jobs,
            alerts,
            dispatcher,
            models,
        }
    }

    /// Jobs of a printer, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] for an unknown printer,
    /// [`LabHubError::Forbidden`], or a storage error.
    pub async fn list_jobs(
        &self,
        actor: &User,
        printer_id: PrinterId,
    ) -> Result<Vec<Job>, LabHubError> {
        let printer = self.load_printer(printer_id).await?;
        ability::authorize(actor, Action::Read, Resource::Job { printer: &printer })?;
        self.jobs.find_by_printer(printer.id).await
    }

    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`], [`LabHubError::Forbidden`], or a
    /// storage error.
    pub async fn get_job(&self, actor: &User, id: JobId) -> Result<Job, LabHubError> {
        self.load_authorized(actor, Action::Read, id).await
    }

    /// Create a job on a printer and announce it as processing.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] (nothing is persisted or
    /// dispatched), [`LabHubError::NotFound`], [`LabHubError::Forbidden`],
    /// or a storage error.
    #[tracing::instrument(skip(self, actor, params), fields(actor = %actor.id))]
    pub async fn create_job(
        &self,
        actor: &User,
        printer_id: PrinterId,
        params: JobParams,
    ) -> Result<Job, LabHubError> {
        let printer = self.load_printer(printer_id).await?;
        ability::authorize(actor, Action::Create, Resource::Job { printer: &printer })?;

        let job = Job::builder()
            .params(params)
            .printer_id(printer.id)
            .created_by_user_id(actor.id)
            .build()?;
        let job = self.jobs.create(job).await?;

        dispatch_detached(
            &self.dispatcher,
            Task::CreateAlert {
                job_id: job.id,
                to_status: Some(STATUS_PROCESSING.to_string()),
                from_status: Some(STATUS_CREATED.to_string()),
            },
        )
        .await;
        Ok(job)
    }

    /// Apply an update; dispatches one alert iff the status changed.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] (nothing is persisted or
    /// dispatched), [`LabHubError::NotFound`], [`LabHubError::Forbidden`],
    /// or a storage error.
    #[tracing::instrument(skip(self, actor, params), fields(actor = %actor.id))]
    pub async fn update_job(
        &self,
        actor: &User,
        id: JobId,
        params: JobParams,
    ) -> Result<Job, LabHubError> {
        let mut job = self.load_authorized(actor, Action::Update, id).await?;

        let change = job.apply(params, now());
        job.validate()?;
        let job = self.jobs.update(job).await?;

        if change.is_changed() {
            tracing::debug!(from = ?change.from, to = ?change.to, "job status changed");
            dispatch_detached(
                &self.dispatcher,
                Task::CreateAlert {
                    job_id: job.id,
                    to_status: change.to,
                    from_status: change.from,
                },
            )
            .await;
        }
        Ok(job)
    }

    /// Ask for a job to be cancelled. The record itself is kept.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`], [`LabHubError::Forbidden`] unless
    /// `actor` is an admin, or a storage error.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn cancel_job(&self, actor: &User, id: JobId) -> Result<(), LabHubError> {
        let job = self.load_authorized(actor, Action::Destroy, id).await?;
        dispatch_detached(&self.dispatcher, Task::CancelJob { job_id: job.id }).await;
        Ok(())
    }

    /// Store the model file of a job, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] for a blank file name or empty
    /// body, [`LabHubError::NotFound`], [`LabHubError::Forbidden`], or a
    /// storage/upload error.
    #[tracing::instrument(skip(self, actor, bytes), fields(actor = %actor.id, size = bytes.len()))]
    pub async fn attach_model(
        &self,
        actor: &User,
        id: JobId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Job, LabHubError> {
        let mut job = self.load_authorized(actor, Action::Update, id).await?;

        let mut errors = ValidationError::new();
        if file_name.trim().is_empty() {
            errors.add("model_file_name", messages::BLANK);
        }
        if bytes.is_empty() {
            errors.add("model", messages::BLANK);
        }
        errors.into_result()?;

        let key = self.models.store(job.id, file_name, bytes).await?;
        let previous = job.model.replace(key.clone());
        job.model_file_name = Some(file_name.to_string());
        job.updated_at = now();
        let job = self.jobs.update(job).await?;

        if let Some(old) = previous.filter(|old| *old != key)
            && let Err(err) = self.models.remove(&old).await
        {
            tracing::warn!(%err, key = %old, "failed to remove replaced model file");
        }
        Ok(job)
    }

    /// Read the model file of a job, returning its file name and content.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] when the job or its model is
    /// missing, [`LabHubError::Forbidden`], or an upload error.
    pub async fn fetch_model(
        &self,
        actor: &User,
        id: JobId,
    ) -> Result<(String, Vec<u8>), LabHubError> {
        let job = self.load_authorized(actor, Action::Read, id).await?;
        let Some(key) = job.model else {
            return Err(NotFoundError {
                entity: "Model",
                id: id.to_string(),
            }
            .into());
        };
        let bytes = self.models.load(&key).await?;
        let file_name = job.model_file_name.unwrap_or_else(|| "model".to_string());
        Ok((file_name, bytes))
    }

    /// Status alerts of a job, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`], [`LabHubError::Forbidden`], or a
    /// storage error.
    pub async fn list_alerts(&self, actor: &User, id: JobId) -> Result<Vec<Alert>, LabHubError> {
        let job = self.load_authorized(actor, Action::Read, id).await?;
        self.alerts.find_by_job(job.id).await
    }

    async fn load_printer(&self, id: PrinterId) -> Result<Printer, LabHubError> {
        self.printers.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Printer",
                id: id.to_string(),
            }
            .into()
        })
    }

    async fn load_authorized(
        &self,
        actor: &User,
        action: Action,
        id: JobId,
    ) -> Result<Job, LabHubError> {
        let job = self.jobs.get_by_id(id).await?.ok_or_else(|| NotFoundError {
            entity: "Job",
            id: id.to_string(),
        })?;
        let printer = self.load_printer(job.printer_id).await?;
        ability::authorize(actor, action, Resource::Job { printer: &printer })?;
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        ClosedDispatcher, InMemoryAlertRepo, InMemoryJobRepo, InMemoryModelStore,
        InMemoryPrinterRepo, RecordingDispatcher, admin, member,
    };
    use labhub_domain::job::{JobData, Progress};

    type Service<D> = JobService<
        InMemoryPrinterRepo,
        InMemoryJobRepo,
        InMemoryAlertRepo,
        D,
        InMemoryModelStore,
    >;

    struct Fixture<D> {
        svc: Service<D>,
        jobs: InMemoryJobRepo,
        owner: User,
        printer: Printer,
    }

    async fn fixture_with<D: TaskDispatcher>(dispatcher: D) -> Fixture<D> {
        let printers = InMemoryPrinterRepo::default();
        let jobs = InMemoryJobRepo::default();
        let owner = member("Bob");
        let printer = Printer::builder()
            .name("Bench")
            .owner_id(owner.id)
            .build()
            .unwrap();
        printers.create(printer.clone()).await.unwrap();
        let svc = JobService::new(
            printers,
            jobs.clone(),
            InMemoryAlertRepo::default(),
            dispatcher,
            InMemoryModelStore::default(),
        );
        Fixture {
            svc,
            jobs,
            owner,
            printer,
        }
    }

    async fn fixture() -> (Fixture<RecordingDispatcher>, RecordingDispatcher) {
        let dispatcher = RecordingDispatcher::default();
        (fixture_with(dispatcher.clone()).await, dispatcher)
    }

    fn with_status(status: &str) -> JobParams {
        JobParams {
            model_file_name: None,
            data: Some(JobData {
                status: Some(status.to_string()),
                ..JobData::default()
            }),
        }
    }

    #[tokio::test]
    async fn should_create_job_under_printer_and_dispatch_processing_alert() {
        let (fx, dispatcher) = fixture().await;
        let params = JobParams {
            model_file_name: Some("benchy.gcode".into()),
            data: None,
        };

        let job = fx
            .svc
            .create_job(&fx.owner, fx.printer.id, params)
            .await
            .unwrap();

        assert_eq!(job.printer_id, fx.printer.id);
        assert_eq!(job.created_by_user_id, fx.owner.id);
        assert_eq!(
            fx.svc.list_jobs(&fx.owner, fx.printer.id).await.unwrap(),
            vec![job.clone()]
        );
        assert_eq!(
            dispatcher.tasks(),
            vec![Task::CreateAlert {
                job_id: job.id,
                to_status: Some("processing".into()),
                from_status: Some("created".into()),
            }]
        );
    }

    #[tokio::test]
    async fn should_not_persist_or_dispatch_invalid_job() {
        let (fx, dispatcher) = fixture().await;
        let params = JobParams {
            model_file_name: None,
            data: Some(JobData {
                progress: Some(Progress {
                    completion: Some(150.0),
                    ..Progress::default()
                }),
                ..JobData::default()
            }),
        };

        let result = fx.svc.create_job(&fx.owner, fx.printer.id, params).await;

        assert!(matches!(result, Err(LabHubError::Validation(_))));
        assert!(fx.jobs.store.lock().unwrap().is_empty());
        assert!(dispatcher.tasks().is_empty());
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_printer() {
        let (fx, _) = fixture().await;

        let result = fx
            .svc
            .create_job(&fx.owner, PrinterId::new(), JobParams::default())
            .await;

        assert!(matches!(result, Err(LabHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_forbid_creating_job_on_foreign_printer() {
        let (fx, dispatcher) = fixture().await;

        let result = fx
            .svc
            .create_job(&member("Eve"), fx.printer.id, JobParams::default())
            .await;

        assert!(matches!(result, Err(LabHubError::Forbidden(_))));
        assert!(fx.jobs.store.lock().unwrap().is_empty());
        assert!(dispatcher.tasks().is_empty());
    }

    #[tokio::test]
    async fn should_dispatch_alert_only_when_status_changes() {
        let (fx, dispatcher) = fixture().await;
        let job = fx
            .svc
            .create_job(&fx.owner, fx.printer.id, with_status("printing"))
            .await
            .unwrap();
        dispatcher.tasks.lock().unwrap().clear();

        fx.svc
            .update_job(&fx.owner, job.id, with_status("printing"))
            .await
            .unwrap();
        assert!(dispatcher.tasks().is_empty());

        fx.svc
            .update_job(&fx.owner, job.id, with_status("paused"))
            .await
            .unwrap();
        assert_eq!(
            dispatcher.tasks(),
            vec![Task::CreateAlert {
                job_id: job.id,
                to_status: Some("paused".into()),
                from_status: Some("printing".into()),
            }]
        );
    }

    #[tokio::test]
    async fn should_keep_status_when_update_has_no_data() {
        let (fx, dispatcher) = fixture().await;
        let job = fx
            .svc
            .create_job(&fx.owner, fx.printer.id, with_status("printing"))
            .await
            .unwrap();
        dispatcher.tasks.lock().unwrap().clear();

        let updated = fx
            .svc
            .update_job(
                &fx.owner,
                job.id,
                JobParams {
                    model_file_name: Some("renamed.gcode".into()),
                    data: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status(), Some("printing"));
        assert_eq!(updated.model_file_name.as_deref(), Some("renamed.gcode"));
        assert!(dispatcher.tasks().is_empty());
    }

    #[tokio::test]
    async fn should_not_dispatch_when_update_invalid() {
        let (fx, dispatcher) = fixture().await;
        let job = fx
            .svc
            .create_job(&fx.owner, fx.printer.id, with_status("printing"))
            .await
            .unwrap();
        dispatcher.tasks.lock().unwrap().clear();
        let mut params = with_status("done");
        if let Some(data) = params.data.as_mut() {
            data.estimated_print_time = Some(-1.0);
        }

        let result = fx.svc.update_job(&fx.owner, job.id, params).await;

        assert!(matches!(result, Err(LabHubError::Validation(_))));
        assert!(dispatcher.tasks().is_empty());
        let stored = fx.svc.get_job(&fx.owner, job.id).await.unwrap();
        assert_eq!(stored.status(), Some("printing"));
    }

    #[tokio::test]
    async fn should_cancel_without_removing_record() {
        let (fx, dispatcher) = fixture().await;
        let job = fx
            .svc
            .create_job(&fx.owner, fx.printer.id, JobParams::default())
            .await
            .unwrap();

        fx.svc.cancel_job(&admin(), job.id).await.unwrap();

        assert!(fx.jobs.store.lock().unwrap().contains_key(&job.id));
        assert_eq!(
            dispatcher.tasks().last(),
            Some(&Task::CancelJob { job_id: job.id })
        );
    }

    #[tokio::test]
    async fn should_forbid_owner_to_cancel() {
        let (fx, _) = fixture().await;
        let job = fx
            .svc
            .create_job(&fx.owner, fx.printer.id, JobParams::default())
            .await
            .unwrap();

        let result = fx.svc.cancel_job(&fx.owner, job.id).await;

        assert!(matches!(result, Err(LabHubError::Forbidden(_))));
    }

    #[tokio::test]
    async fn should_succeed_even_when_dispatch_fails() {
        let fx = fixture_with(ClosedDispatcher).await;

        let job = fx
            .svc
            .create_job(&fx.owner, fx.printer.id, JobParams::default())
            .await
            .unwrap();

        assert!(fx.jobs.store.lock().unwrap().contains_key(&job.id));
    }

    #[tokio::test]
    async fn should_store_and_fetch_model_file() {
        let (fx, _) = fixture().await;
        let job = fx
            .svc
            .create_job(&fx.owner, fx.printer.id, JobParams::default())
            .await
            .unwrap();

        let updated = fx
            .svc
            .attach_model(&fx.owner, job.id, "part.stl", b"solid part".to_vec())
            .await
            .unwrap();
        assert_eq!(updated.model_file_name.as_deref(), Some("part.stl"));
        assert!(updated.model.is_some());

        let (name, bytes) = fx.svc.fetch_model(&fx.owner, job.id).await.unwrap();
        assert_eq!(name, "part.stl");
        assert_eq!(bytes, b"solid part");
    }

    #[tokio::test]
    async fn should_reject_empty_model_upload() {
        let (fx, _) = fixture().await;
        let job = fx
            .svc
            .create_job(&fx.owner, fx.printer.id, JobParams::default())
            .await
            .unwrap();

        let result = fx.svc.attach_model(&fx.owner, job.id, " ", Vec::new()).await;

        let Err(LabHubError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert!(errors.get("model").is_some());
        assert!(errors.get("model_file_name").is_some());
    }

    #[tokio::test]
    async fn should_return_not_found_when_model_missing() {
        let (fx, _) = fixture().await;
        let job = fx
            .svc
            .create_job(&fx.owner, fx.printer.id, JobParams::default())
            .await
            .unwrap();

        let result = fx.svc.fetch_model(&fx.owner, job.id).await;

        assert!(matches!(result, Err(LabHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_forbid_foreign_model_download() {
        let (fx, _) = fixture().await;
        let job = fx
            .svc
            .create_job(&fx.owner, fx.printer.id, JobParams::default())
            .await
            .unwrap();
        fx.svc
            .attach_model(&fx.owner, job.id, "part.stl", b"solid".to_vec())
            .await
            .unwrap();

        let result = fx.svc.fetch_model(&member("Eve"), job.id).await;

        assert!(matches!(result, Err(LabHubError::Forbidden(_))));
    }
}
