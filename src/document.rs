// src/document.rs
use anyhow::Result;

use crate::scrape::JobDetails;
use crate::storage::UserProfile;

pub const TEX_MEDIA_TYPE: &str = "application/x-tex";
pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

// Leading slice inspected by the emptiness check.
const HEAD_BYTES: usize = 1024;

/// The resume text with the job comment block appended, ready for upload.
/// Keeps the original filename; the media type is fixed.
#[derive(Debug, Clone)]
pub struct AnnotatedDocument {
    pub name: String,
    pub content: String,
    pub media_type: &'static str,
}

impl AnnotatedDocument {
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Append a structured comment block describing the target job to the stored
/// resume text. Every description line is commented out so the document still
/// compiles as TeX.
pub fn annotate_resume(profile: &UserProfile, job: &JobDetails) -> AnnotatedDocument {
    let commented_description = job
        .job_description
        .lines()
        .map(|line| format!("% {}", line))
        .collect::<Vec<_>>()
        .join("\n");

    let content = format!(
        "{}\n\n% Job Details\n% Company: {}\n% Role: {}\n% Description:\n{}",
        profile.resume_content, job.company, job.job_role, commented_description
    );

    AnnotatedDocument {
        name: profile.resume_name.clone(),
        content,
        media_type: TEX_MEDIA_TYPE,
    }
}

/// Validate the annotated document before any network call. Each rejection
/// carries its own message so the user knows what to fix.
pub fn validate_document(document: &AnnotatedDocument) -> Result<()> {
    if !document.name.ends_with(".tex") {
        anyhow::bail!("File must be a .tex file");
    }

    if document.size() > MAX_DOCUMENT_BYTES {
        anyhow::bail!("File size must be less than 5MB");
    }

    let head_len = document.content.len().min(HEAD_BYTES);
    let head = String::from_utf8_lossy(&document.content.as_bytes()[..head_len]);
    if head.trim().is_empty() {
        anyhow::bail!("File appears to be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            email: "dev@example.com".to_string(),
            resume_content: "\\documentclass{article}\nExperience: Rust".to_string(),
            resume_name: "resume.tex".to_string(),
        }
    }

    fn job() -> JobDetails {
        JobDetails {
            company: "Acme Corp".to_string(),
            job_role: "Rust Engineer".to_string(),
            job_description: "Build servers.\nShip features.".to_string(),
        }
    }

    #[test]
    fn annotation_appends_commented_job_block() {
        let doc = annotate_resume(&profile(), &job());

        assert_eq!(doc.name, "resume.tex");
        assert_eq!(doc.media_type, TEX_MEDIA_TYPE);
        assert_eq!(
            doc.content,
            "\\documentclass{article}\nExperience: Rust\n\n\
             % Job Details\n\
             % Company: Acme Corp\n\
             % Role: Rust Engineer\n\
             % Description:\n\
             % Build servers.\n\
             % Ship features."
        );
    }

    #[test]
    fn annotated_document_passes_validation() {
        let doc = annotate_resume(&profile(), &job());
        assert!(validate_document(&doc).is_ok());
    }

    #[test]
    fn rejects_wrong_extension() {
        let mut doc = annotate_resume(&profile(), &job());
        doc.name = "resume.txt".to_string();

        let err = validate_document(&doc).unwrap_err();
        assert_eq!(err.to_string(), "File must be a .tex file");
    }

    #[test]
    fn rejects_oversized_document() {
        let mut doc = annotate_resume(&profile(), &job());
        doc.content = "x".repeat(6 * 1024 * 1024);

        let err = validate_document(&doc).unwrap_err();
        assert_eq!(err.to_string(), "File size must be less than 5MB");
    }

    #[test]
    fn rejects_whitespace_only_content() {
        let doc = AnnotatedDocument {
            name: "resume.tex".to_string(),
            content: "   \n\t  \n".to_string(),
            media_type: TEX_MEDIA_TYPE,
        };

        let err = validate_document(&doc).unwrap_err();
        assert_eq!(err.to_string(), "File appears to be empty");
    }

    #[test]
    fn exactly_five_mib_is_accepted() {
        let mut doc = annotate_resume(&profile(), &job());
        doc.content = "x".repeat(MAX_DOCUMENT_BYTES);
        assert!(validate_document(&doc).is_ok());
    }
}
