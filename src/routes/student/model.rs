use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckTokenResponse {
    pub student_id: String,
    /// Epoch milliseconds.
    pub expires_at: Option<i64>,
}
