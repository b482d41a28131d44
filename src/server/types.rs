use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::qa::Mode;

/// Envelope for every `/api` reply: `{code, data, msg}`.
///
/// Input errors travel in `code` with HTTP 200, so the frontend only has to
/// inspect the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub data: T,
    pub msg: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            data,
            msg: "success".to_string(),
        }
    }

    pub fn bad_request(data: T, msg: impl Into<String>) -> Self {
        Self {
            code: 400,
            data,
            msg: msg.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Body of `POST /api/qa`
#[derive(Debug, Clone, Deserialize)]
pub struct QaRequest {
    pub question: String,
    #[serde(default)]
    pub mode: Mode,
}

/// Query string of `GET /api/graph-data`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::ok(vec!["Vue"])).unwrap();
        assert_eq!(json["code"], 200);
        assert_eq!(json["data"][0], "Vue");
        assert_eq!(json["msg"], "success");
    }

    #[test]
    fn test_qa_request_mode_defaults_to_quick() {
        let req: QaRequest = serde_json::from_str(r#"{"question": "What is Vue?"}"#).unwrap();
        assert_eq!(req.mode, Mode::Quick);
        let req: QaRequest =
            serde_json::from_str(r#"{"question": "What is Vue?", "mode": "deep"}"#).unwrap();
        assert_eq!(req.mode, Mode::Deep);
    }
}
