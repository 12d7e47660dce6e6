use super::super::docs::ApiDoc;
use crate::constants::SERVER_BANNER;
use axum::Json;
use utoipa::OpenApi;

pub async fn banner_handler() -> &'static str {
    SERVER_BANNER
}

pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
