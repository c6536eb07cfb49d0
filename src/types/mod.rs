use serde::Serialize;

use crate::utils::kolkata_now_rfc3339;

/// Standard response envelope for endpoints that report an action result
/// rather than a resource. `success: false` is a soft, user-visible warning
/// carried in a 200 response; hard failures use status codes instead.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.to_string(),
            timestamp: kolkata_now_rfc3339(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: message.to_string(),
            timestamp: kolkata_now_rfc3339(),
        }
    }
}
