//! Task runner: what the background worker does with each [`Task`].

use std::future::Future;

use labhub_domain::alert::Alert;
use labhub_domain::error::LabHubError;
use labhub_domain::id::JobId;
use labhub_domain::job::{STATUS_CANCELLED, StatusChange};
use labhub_domain::task::Task;
use labhub_domain::time::now;

use crate::ports::{AlertRepository, JobRepository};
use crate::task_queue::TaskHandler;

/// Executes dispatched tasks against storage.
///
/// Hub notifications have no gateway to talk to yet, so they are only
/// logged.
pub struct TaskRunner<J, A> {
    jobs: J,
    alerts: A,
}

impl<J: JobRepository, A: AlertRepository> TaskRunner<J, A> {
    pub fn new(jobs: J, alerts: A) -> Self {
        Self { jobs, alerts }
    }

    async fn create_alert(
        &self,
        job_id: JobId,
        from_status: Option<String>,
        to_status: Option<String>,
    ) -> Result<(), LabHubError> {
        let Some(job) = self.jobs.get_by_id(job_id).await? else {
            tracing::warn!(job = %job_id, "job vanished before its alert was recorded");
            return Ok(());
        };
        let alert = Alert::new(
            job.id,
            job.printer_id,
            StatusChange {
                from: from_status,
                to: to_status,
            },
            now(),
        );
        let alert = self.alerts.record(alert).await?;
        tracing::info!(job = %job.id, printer = %job.printer_id, "{}", alert.summary());
        Ok(())
    }

    async fn cancel_job(&self, job_id: JobId) -> Result<(), LabHubError> {
        let Some(mut job) = self.jobs.get_by_id(job_id).await? else {
            tracing::warn!(job = %job_id, "cannot cancel missing job");
            return Ok(());
        };
        if job.status() == Some(STATUS_CANCELLED) {
            return Ok(());
        }
        let at = now();
        let change = job.set_status(STATUS_CANCELLED, at);
        let job = self.jobs.update(job).await?;
        self.alerts
            .record(Alert::new(job.id, job.printer_id, change, at))
            .await?;
        tracing::info!(job = %job.id, "job cancelled");
        Ok(())
    }
}

impl<J, A> TaskHandler for TaskRunner<J, A>
where
    J: JobRepository + Send + Sync,
    A: AlertRepository + Send + Sync,
{
    fn handle(&self, task: &Task) -> impl Future<Output = Result<(), LabHubError>> + Send {
        let task = task.clone();
        async move {
            match task {
                Task::CreateAlert {
                    job_id,
                    to_status,
                    from_status,
                } => self.create_alert(job_id, from_status, to_status).await,
                Task::CancelJob { job_id } => self.cancel_job(job_id).await,
                Task::RegisterSensor { sensor_id, hub_id } => {
                    tracing::info!(sensor = %sensor_id, hub = %hub_id, "register sensor with hub");
                    Ok(())
                }
                Task::DeleteSensor { hub_id, sensor_id } => {
                    tracing::info!(sensor = %sensor_id, hub = %hub_id, "remove sensor from hub");
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryAlertRepo, InMemoryJobRepo};
    use labhub_domain::id::{HubId, PrinterId, SensorId, UserId};
    use labhub_domain::job::Job;

    async fn runner_with_job(
        status: &str,
    ) -> (TaskRunner<InMemoryJobRepo, InMemoryAlertRepo>, InMemoryAlertRepo, Job) {
        let jobs = InMemoryJobRepo::default();
        let alerts = InMemoryAlertRepo::default();
        let job = Job::builder()
            .printer_id(PrinterId::new())
            .created_by_user_id(UserId::new())
            .status(status)
            .build()
            .unwrap();
        jobs.create(job.clone()).await.unwrap();
        (TaskRunner::new(jobs, alerts.clone()), alerts, job)
    }

    #[tokio::test]
    async fn should_record_alert_for_job() {
        let (runner, alerts, job) = runner_with_job("printing").await;

        runner
            .handle(&Task::CreateAlert {
                job_id: job.id,
                to_status: Some("paused".into()),
                from_status: Some("printing".into()),
            })
            .await
            .unwrap();

        let recorded = alerts.store.lock().unwrap().clone();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].printer_id, job.printer_id);
        assert_eq!(recorded[0].to_status.as_deref(), Some("paused"));
        assert_eq!(recorded[0].from_status.as_deref(), Some("printing"));
    }

    #[tokio::test]
    async fn should_ignore_alert_for_missing_job() {
        let (runner, alerts, _) = runner_with_job("printing").await;

        runner
            .handle(&Task::CreateAlert {
                job_id: JobId::new(),
                to_status: None,
                from_status: None,
            })
            .await
            .unwrap();

        assert!(alerts.store.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_cancel_job_once() {
        let (runner, alerts, job) = runner_with_job("printing").await;
        let task = Task::CancelJob { job_id: job.id };

        runner.handle(&task).await.unwrap();
        runner.handle(&task).await.unwrap();

        let stored = runner.jobs.get_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status(), Some(STATUS_CANCELLED));
        let recorded = alerts.store.lock().unwrap().clone();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].from_status.as_deref(), Some("printing"));
    }

    #[tokio::test]
    async fn should_accept_hub_notifications() {
        let (runner, alerts, _) = runner_with_job("printing").await;

        runner
            .handle(&Task::RegisterSensor {
                sensor_id: SensorId::new(),
                hub_id: HubId::new(),
            })
            .await
            .unwrap();

        assert!(alerts.store.lock().unwrap().is_empty());
    }
}
