// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket};
use tracing::{error, info};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS",
        ));
        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type, Accept, Origin, X-Requested-With",
        ));
    }
}

#[get("/health")]
pub async fn health() -> Json<HealthResponse> {
    handlers::health_handler().await
}

#[post("/convert", data = "<upload>")]
pub async fn convert(
    upload: Form<ConvertUpload<'_>>,
) -> Result<Json<ConvertAck>, status::Custom<Json<ErrorResponse>>> {
    handlers::convert_handler(upload).await
}

// Preflight requests get an empty success response.
#[options("/<_..>")]
pub async fn preflight() -> Status {
    Status::NoContent
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Invalid request format"))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Not found"))
}

#[rocket::catch(413)]
pub fn payload_too_large() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("File size must be less than 5MB"))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Internal server error"))
}

pub fn build_rocket(port: u16) -> Rocket<Build> {
    let limits = Limits::default()
        .limit("file", 5.mebibytes())
        .limit("data-form", 6.mebibytes());

    let figment = rocket::Config::figment()
        .merge(("address", std::net::IpAddr::from([0, 0, 0, 0])))
        .merge(("port", port))
        .merge(("limits", limits));

    rocket::custom(figment)
        .attach(Cors)
        .register(
            "/",
            catchers![bad_request, not_found, payload_too_large, internal_error],
        )
        .mount("/", routes![health, convert, preflight])
}

// Main server start function
pub async fn start_web_server(port: u16) -> Result<()> {
    info!("Starting relay server on port {}", port);

    if let Err(e) = build_rocket(port).launch().await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
