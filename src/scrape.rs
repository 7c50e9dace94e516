// src/scrape.rs
use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Best-effort job fields scraped from a posting page. Fields are trimmed and
/// empty when no selector matched; the caller corrects them by hand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetails {
    pub company: String,
    pub job_role: String,
    pub job_description: String,
}

const TITLE_SELECTORS: &[&str] = &["h1"];
const COMPANY_SELECTORS: &[&str] = &[".company-name", "[data-company]"];
const DESCRIPTION_SELECTORS: &[&str] = &[".job-description", "[data-job-description]"];

/// Extract job details from a parsed page snapshot.
///
/// Pure over the document: no retained state, no side effects, and it never
/// fails. A selector wins its fallback chain when its element exists and
/// carries any text at all; trimming happens afterwards, so an
/// all-whitespace match still resolves to the empty string.
pub fn extract_job_details(document: &Html) -> JobDetails {
    let job_role = first_text(document, TITLE_SELECTORS).unwrap_or_default();
    let company = first_text(document, COMPANY_SELECTORS).unwrap_or_default();
    let job_description = first_text(document, DESCRIPTION_SELECTORS).unwrap_or_default();

    JobDetails {
        company: company.trim().to_string(),
        job_role: job_role.trim().to_string(),
        job_description: job_description.trim().to_string(),
    }
}

/// Parse raw HTML and extract job details from it.
pub fn extract_from_html(html: &str) -> JobDetails {
    extract_job_details(&Html::parse_document(html))
}

fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = element.text().collect::<String>();
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

/// Fetches a job posting page and runs the extraction over its body.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    pub async fn fetch_job_details(&self, url: &str) -> Result<JobDetails> {
        info!("Fetching job post: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch job post")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        let html = response
            .text()
            .await
            .context("Failed to read response body")?;

        Ok(extract_from_html(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_fields_from_class_selectors() {
        let details = extract_from_html(
            r#"<html><body>
                <h1>Senior Rust Engineer</h1>
                <div class="company-name">Acme Corp</div>
                <div class="job-description">Build distributed systems.</div>
            </body></html>"#,
        );
        assert_eq!(details.job_role, "Senior Rust Engineer");
        assert_eq!(details.company, "Acme Corp");
        assert_eq!(details.job_description, "Build distributed systems.");
    }

    #[test]
    fn falls_back_to_data_attributes() {
        let details = extract_from_html(
            r#"<html><body>
                <h1>Backend Developer</h1>
                <span data-company>Globex</span>
                <section data-job-description>Maintain the API layer.</section>
            </body></html>"#,
        );
        assert_eq!(details.company, "Globex");
        assert_eq!(details.job_description, "Maintain the API layer.");
    }

    #[test]
    fn missing_selectors_yield_empty_strings() {
        let details = extract_from_html("<html><body><p>nothing here</p></body></html>");
        assert_eq!(details.company, "");
        assert_eq!(details.job_role, "");
        assert_eq!(details.job_description, "");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let details = extract_from_html(
            r#"<h1>
                Staff Engineer
            </h1><div class="company-name">  Initech  </div>"#,
        );
        assert_eq!(details.job_role, "Staff Engineer");
        assert_eq!(details.company, "Initech");
    }

    #[test]
    fn whitespace_only_match_wins_its_chain_then_trims_empty() {
        // .company-name exists with whitespace text, so [data-company] is not
        // consulted and the result trims down to empty.
        let details = extract_from_html(
            r#"<div class="company-name">   </div><span data-company>Hooli</span>"#,
        );
        assert_eq!(details.company, "");
    }

    #[test]
    fn never_panics_on_malformed_html() {
        let details = extract_from_html("<h1><div></h1 <<<>>> &nbsp; <span class=");
        assert!(details.company.is_empty());
    }
}
