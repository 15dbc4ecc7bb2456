use axum::Json;

use crate::result::ApiResponse;

pub async fn health() -> Json<ApiResponse<&'static str>> {
    ApiResponse::success("ok")
}
