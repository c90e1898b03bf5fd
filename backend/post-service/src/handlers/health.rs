use actix_web::HttpResponse;

/// GET /
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "ok" }))
}
