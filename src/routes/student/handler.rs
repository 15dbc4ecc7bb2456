use axum::{extract::Extension, http::StatusCode, response::IntoResponse};

use crate::{result::ApiResponse, token::StudentClaims};

use super::model::CheckTokenResponse;

#[axum::debug_handler]
pub async fn check_token(Extension(claims): Extension<StudentClaims>) -> impl IntoResponse {
    (
        StatusCode::OK,
        ApiResponse::success(CheckTokenResponse {
            student_id: claims.student_id,
            expires_at: claims.exp,
        }),
    )
}
