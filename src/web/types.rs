// src/web/types.rs
use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::serde::Serialize;

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ConvertAck {
    pub status: String,
    pub message: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// Every field is optional so a missing file reaches the handler and gets the
// specific 400 body instead of a generic form error.
#[derive(FromForm)]
pub struct ConvertUpload<'f> {
    pub file: Option<TempFile<'f>>,
    pub username: Option<String>,
    pub company: Option<String>,
    #[field(name = "jobRole")]
    pub job_role: Option<String>,
}
