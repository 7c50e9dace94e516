pub mod client;
pub mod document;
pub mod environment;
pub mod scrape;
pub mod storage;
pub mod web;
pub mod workflow;

pub use client::BackendClient;
pub use document::{annotate_resume, validate_document, AnnotatedDocument};
pub use environment::EnvironmentConfig;
pub use scrape::{extract_from_html, extract_job_details, JobDetails, PageFetcher};
pub use storage::{detect_backend, Application, ProfileStore, UserProfile};
pub use web::start_web_server;
pub use workflow::{SubmissionOutcome, SubmissionWorkflow};
