use serde::{Deserialize, Serialize};

/// Identity carried by a student portal session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentClaims {
    pub student_id: String,
    /// Set by the signer; ignored when issuing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl StudentClaims {
    pub fn new(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            exp: None,
        }
    }
}
