use actix_web::{HttpResponse, Responder, get, web};
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::error;

/// Health check route
/// This route returns no content, the response status is enough.
#[get("/")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok()
}

/// Prometheus text exposition of the shared registry
#[get("/metrics")]
pub async fn metrics(registry: web::Data<Registry>) -> impl Responder {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&registry.gather(), &mut buffer) {
        error!("Failed to encode metrics: {err}");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok().content_type(encoder.format_type()).body(buffer)
}
