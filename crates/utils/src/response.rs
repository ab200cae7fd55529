use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Envelope used by the read/submit endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_serializes_without_message() {
        let response = ApiResponse::success(3);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 3, "message": null}));
    }
}
