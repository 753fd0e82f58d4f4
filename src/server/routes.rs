use crate::{
    error::Result,
    models::{supported_models, RequestOrigin},
    server::{multipart::read_generate_form, AppState},
};
use actix_multipart::Multipart;
use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse};
use serde_json::json;

fn header_value(req: &HttpRequest, name: header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(String::from)
}

#[post("/api/generate")]
pub async fn generate(
    req: HttpRequest,
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    // Credential check happens before the body is read.
    state.service.api_key()?;

    let form = read_generate_form(payload, state.server.max_upload_bytes).await?;
    let origin = RequestOrigin {
        origin: header_value(&req, header::ORIGIN),
        referer: header_value(&req, header::REFERER),
    };

    let result = state.service.generate(form, &origin).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[get("/api/models")]
pub async fn list_models() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "models": supported_models() }))
}

#[get("/api/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
