use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use job_apply::environment::EnvironmentConfig;
use job_apply::scrape::{JobDetails, PageFetcher};
use job_apply::storage::{detect_backend, Application, ProfileStore, UserProfile};
use job_apply::web::start_web_server;
use job_apply::workflow::SubmissionWorkflow;

#[derive(Parser)]
#[command(name = "applyr")]
#[command(about = "Job application assistant with a relay conversion server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the relay server
    Serve,
    /// Save your email and resume file (re-running resets application history)
    Setup { email: String, resume: PathBuf },
    /// Extract job details from a posting URL
    Scrape { url: String },
    /// Submit an application to the conversion backend
    Submit {
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        job_role: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Job posting URL; fields not given are scraped from it
        #[arg(long)]
        page: Option<String>,
    },
    /// List saved applications
    History,
    /// Print a saved application's fields for re-use (index as shown by history)
    Reload { index: usize },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or(EnvFilter::new("job_apply=info,applyr=info,rocket::server=off")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve => {
            let port = EnvironmentConfig::server_port()?;
            info!("Server running on port {}", port);
            start_web_server(port).await
        }
        Command::Setup { email, resume } => {
            let config = EnvironmentConfig::load()?;
            config.ensure_directories().await?;
            let store = ProfileStore::new(detect_backend(&config).await?);

            let resume_content = tokio::fs::read_to_string(&resume)
                .await
                .with_context(|| format!("Failed to read resume file: {}", resume.display()))?;
            let resume_name = resume
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("resume.tex")
                .to_string();

            store
                .save_profile(&UserProfile {
                    email,
                    resume_content,
                    resume_name,
                })
                .await?;

            println!("Setup saved successfully!");
            Ok(())
        }
        Command::Scrape { url } => {
            let details = PageFetcher::new()?.fetch_job_details(&url).await?;
            println!("Company:     {}", details.company);
            println!("Role:        {}", details.job_role);
            println!("Description: {}", details.job_description);
            Ok(())
        }
        Command::Submit {
            company,
            job_role,
            description,
            page,
        } => {
            let config = EnvironmentConfig::load()?;
            config.ensure_directories().await?;
            let workflow = SubmissionWorkflow::from_environment(&config).await?;

            let scraped = match &page {
                Some(url) if company.is_none() || job_role.is_none() || description.is_none() => {
                    PageFetcher::new()?.fetch_job_details(url).await?
                }
                _ => JobDetails::default(),
            };

            let job = JobDetails {
                company: company.unwrap_or(scraped.company),
                job_role: job_role.unwrap_or(scraped.job_role),
                job_description: description.unwrap_or(scraped.job_description),
            };

            let outcome = workflow.submit(&job, page.as_deref().unwrap_or("")).await?;

            println!("Resume processed successfully!");
            println!("Saved: {}", outcome.output_path.display());
            print_applications(&outcome.applications);
            Ok(())
        }
        Command::History => {
            let config = EnvironmentConfig::load()?;
            let store = ProfileStore::new(detect_backend(&config).await?);
            print_applications(&store.load_applications().await?);
            Ok(())
        }
        Command::Reload { index } => {
            let config = EnvironmentConfig::load()?;
            let store = ProfileStore::new(detect_backend(&config).await?);
            let applications = store.load_applications().await?;

            let application = index
                .checked_sub(1)
                .and_then(|i| applications.get(i))
                .ok_or_else(|| anyhow::anyhow!("No saved application at index {}", index))?;

            println!("Company:     {}", application.company);
            println!("Role:        {}", application.job_role);
            println!("Description: {}", application.description);
            Ok(())
        }
    }
}

fn print_applications(applications: &[Application]) {
    if applications.is_empty() {
        println!("No previous applications");
        return;
    }

    println!("Previous applications:");
    for (i, application) in applications.iter().enumerate() {
        println!(
            "{}. {} - {} (applied {})",
            i + 1,
            application.company,
            application.job_role,
            application.date.format("%Y-%m-%d")
        );
    }
}
