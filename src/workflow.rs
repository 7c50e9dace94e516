// src/workflow.rs
//! Submission orchestration: health check, validation, annotation,
//! persistence, upload, response handling. Strictly sequential; the first
//! failure aborts the attempt and already-persisted state stays intact.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;
use tracing::info;

use crate::client::BackendClient;
use crate::document::{annotate_resume, validate_document};
use crate::environment::EnvironmentConfig;
use crate::scrape::JobDetails;
use crate::storage::{detect_backend, Application, ProfileStore};

#[derive(Debug)]
pub struct SubmissionOutcome {
    pub output_path: PathBuf,
    /// Refreshed history after the new record, for display.
    pub applications: Vec<Application>,
}

pub struct SubmissionWorkflow {
    store: ProfileStore,
    client: BackendClient,
    output_dir: PathBuf,
}

impl SubmissionWorkflow {
    pub fn new(store: ProfileStore, client: BackendClient, output_dir: PathBuf) -> Self {
        Self {
            store,
            client,
            output_dir,
        }
    }

    pub async fn from_environment(config: &EnvironmentConfig) -> Result<Self> {
        let backend = detect_backend(config).await?;
        let client = BackendClient::new(config.backend_url.clone())?;

        Ok(Self::new(
            ProfileStore::new(backend),
            client,
            config.output_path.clone(),
        ))
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Run one submission attempt to completion or to its first failure.
    pub async fn submit(&self, job: &JobDetails, page_url: &str) -> Result<SubmissionOutcome> {
        info!("Checking server status...");
        if !self.client.check_health().await {
            anyhow::bail!("Backend server is not responding. Please try again later.");
        }

        if job.company.is_empty() || job.job_role.is_empty() || job.job_description.is_empty() {
            anyhow::bail!("Please fill in all job details");
        }

        let profile = self
            .store
            .load_profile()
            .await?
            .ok_or_else(|| anyhow::anyhow!("Please complete the initial setup first"))?;

        let document = annotate_resume(&profile, job);
        validate_document(&document)?;

        // The record is persisted before the upload, so a failed conversion
        // leaves an orphaned history entry. At-least-once, no rollback.
        let application = Application {
            company: job.company.clone(),
            job_role: job.job_role.clone(),
            description: job.job_description.clone(),
            date: Utc::now(),
            url: page_url.to_string(),
        };
        let applications = self.store.append_application(application).await?;

        info!("Sending to server...");
        let pdf = self
            .client
            .convert(&document, &profile.email, &job.company, &job.job_role)
            .await?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create output directory: {}",
                    self.output_dir.display()
                )
            })?;

        let output_path = self
            .output_dir
            .join(format!("{}_{}.pdf", job.company, job.job_role));
        tokio::fs::write(&output_path, &pdf)
            .await
            .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

        info!("Resume processed successfully: {}", output_path.display());

        Ok(SubmissionOutcome {
            output_path,
            applications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, UserProfile};
    use crate::web;

    async fn store_with_profile(dir: &std::path::Path) -> ProfileStore {
        let store = ProfileStore::new(Box::new(FileStore::open(dir).await.unwrap()));
        store
            .save_profile(&UserProfile {
                email: "dev@example.com".to_string(),
                resume_content: "\\documentclass{article}\nExperience".to_string(),
                resume_name: "resume.tex".to_string(),
            })
            .await
            .unwrap();
        store
    }

    fn full_job() -> JobDetails {
        JobDetails {
            company: "Acme".to_string(),
            job_role: "Engineer".to_string(),
            job_description: "Build things".to_string(),
        }
    }

    fn workflow(store: ProfileStore, base_url: &str, output: PathBuf) -> SubmissionWorkflow {
        SubmissionWorkflow::new(
            store,
            BackendClient::new(base_url.to_string()).unwrap(),
            output,
        )
    }

    // Reserve a free port, then serve the relay on it for the duration of the
    // test. The stub acknowledges uploads with JSON, never a PDF.
    async fn spawn_relay() -> String {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let rocket = web::build_rocket(port);
        tokio::spawn(async move {
            let _ = rocket.launch().await;
        });

        let base_url = format!("http://127.0.0.1:{}", port);
        let probe = BackendClient::new(base_url.clone()).unwrap();
        for _ in 0..50 {
            if probe.check_health().await {
                return base_url;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        panic!("relay server did not come up");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn probe_failure_aborts_before_any_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_profile(dir.path()).await;
        // Nothing listens here, so the probe fails.
        let wf = workflow(store, "http://127.0.0.1:9", dir.path().join("out"));

        let err = wf.submit(&full_job(), "https://jobs.example.com/1").await;
        assert_eq!(
            err.unwrap_err().to_string(),
            "Backend server is not responding. Please try again later."
        );
        assert!(wf.store().load_applications().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_job_fields_abort_without_mutating_history() {
        let base_url = spawn_relay().await;
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_profile(dir.path()).await;
        let wf = workflow(store, &base_url, dir.path().join("out"));

        let mut job = full_job();
        job.job_description = String::new();

        // Repeated failed submissions stay idempotent with respect to history.
        for _ in 0..2 {
            let err = wf.submit(&job, "").await.unwrap_err();
            assert_eq!(err.to_string(), "Please fill in all job details");
        }
        assert!(wf.store().load_applications().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_profile_aborts_submission() {
        let base_url = spawn_relay().await;
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(Box::new(FileStore::open(dir.path()).await.unwrap()));
        let wf = workflow(store, &base_url, dir.path().join("out"));

        let err = wf.submit(&full_job(), "").await.unwrap_err();
        assert_eq!(err.to_string(), "Please complete the initial setup first");
        assert!(wf.store().load_applications().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn record_persists_even_when_response_validation_fails() {
        // The relay stub acknowledges with JSON rather than a PDF, so the
        // attempt fails at response validation - after the record was saved.
        let base_url = spawn_relay().await;
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_profile(dir.path()).await;
        let wf = workflow(store, &base_url, dir.path().join("out"));

        let err = wf
            .submit(&full_job(), "https://jobs.example.com/1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid response format from server");

        let history = wf.store().load_applications().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].company, "Acme");
        assert_eq!(history[0].url, "https://jobs.example.com/1");
    }
}
