// src/web/handlers.rs
use chrono::Utc;
use rocket::form::Form;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use tracing::{error, info};

use super::types::{ConvertAck, ConvertUpload, ErrorResponse, HealthResponse};

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Accepts the multipart upload and acknowledges it. The spooled file is where
/// the external conversion service would pick up; no transformation happens
/// here.
pub async fn convert_handler(
    mut upload: Form<ConvertUpload<'_>>,
) -> Result<Json<ConvertAck>, status::Custom<Json<ErrorResponse>>> {
    let username = upload.username.clone().unwrap_or_default();
    let company = upload.company.clone().unwrap_or_default();
    let job_role = upload.job_role.clone().unwrap_or_default();

    let Some(file) = upload.file.as_mut() else {
        return Err(status::Custom(
            Status::BadRequest,
            Json(ErrorResponse::new("No file uploaded")),
        ));
    };

    let file_name = file
        .raw_name()
        .and_then(|n| n.as_str())
        .unwrap_or("upload.tex")
        .to_string();

    info!(
        "Received conversion request: file={} size={} username={} company={} jobRole={}",
        file_name,
        file.len(),
        username,
        company,
        job_role,
    );

    let spool_path = std::env::temp_dir().join(format!("convert_upload_{}", uuid::Uuid::new_v4()));

    if let Err(e) = file.persist_to(&spool_path).await {
        error!("Failed to spool uploaded file: {}", e);
        return Err(status::Custom(
            Status::InternalServerError,
            Json(ErrorResponse::new("Failed to process uploaded file")),
        ));
    }

    // Conversion stub: the document is accepted and discarded.
    let _ = tokio::fs::remove_file(&spool_path).await;

    Ok(Json(ConvertAck {
        status: "success".to_string(),
        message: "File processed successfully".to_string(),
    }))
}
