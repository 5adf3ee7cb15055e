use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use ticker::PriceSourceError;

/// Uniform response envelope: every route answers
/// `{success, data?, error?}`.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
  pub fn ok(data: T) -> Json<Self> {
    Json(Self {
      success: true,
      data: Some(data),
      error: None,
    })
  }
}

impl ApiResponse<()> {
  pub fn err(message: impl Into<String>) -> Json<Self> {
    Json(Self {
      success: false,
      data: None,
      error: Some(message.into()),
    })
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("{0}")]
  Validation(String),
  #[error("{0}")]
  State(String),
  #[error("unauthorized")]
  Unauthorized,
  #[error("forbidden")]
  Forbidden,
  #[error("{0} not found")]
  NotFound(&'static str),
  #[error("{0}; retry shortly")]
  Upstream(String),
  #[error(transparent)]
  Internal(#[from] anyhow::Error),
}

impl From<PriceSourceError> for ApiError {
  fn from(e: PriceSourceError) -> Self {
    match e {
      PriceSourceError::UnknownSymbol(s) => ApiError::Validation(format!("unknown symbol: {s}")),
      PriceSourceError::OutOfRange => ApiError::Validation("timestamp out of range".into()),
      PriceSourceError::SourceUnavailable(msg) => ApiError::Upstream(msg),
    }
  }
}

impl From<common::ParseEnumError> for ApiError {
  fn from(e: common::ParseEnumError) -> Self {
    ApiError::Validation(e.to_string())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::State(_) => StatusCode::CONFLICT,
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Internal(e) => {
        log::error!("internal error: {e:#}");
        return (
          StatusCode::INTERNAL_SERVER_ERROR,
          ApiResponse::err("internal error"),
        )
          .into_response();
      }
    };
    (status, ApiResponse::err(self.to_string())).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_codes_by_category() {
    let cases = [
      (ApiError::Validation("bad".into()), StatusCode::BAD_REQUEST),
      (ApiError::State("busy".into()), StatusCode::CONFLICT),
      (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
      (ApiError::Forbidden, StatusCode::FORBIDDEN),
      (ApiError::NotFound("duel"), StatusCode::NOT_FOUND),
      (
        ApiError::Upstream("price feed down".into()),
        StatusCode::SERVICE_UNAVAILABLE,
      ),
    ];
    for (err, expected) in cases {
      assert_eq!(err.into_response().status(), expected);
    }
  }

  #[test]
  fn envelope_shape() {
    let ok = serde_json::to_value(&ApiResponse {
      success: true,
      data: Some(1),
      error: None,
    })
    .unwrap();
    assert_eq!(ok["success"], true);
    assert_eq!(ok["data"], 1);
    assert!(ok.get("error").is_none());

    let err = serde_json::to_value(&ApiResponse::<()> {
      success: false,
      data: None,
      error: Some("unknown symbol: X".into()),
    })
    .unwrap();
    assert_eq!(err["success"], false);
    assert_eq!(err["error"], "unknown symbol: X");
    assert!(err.get("data").is_none());
  }

  #[test]
  fn price_source_errors_map_to_api_categories() {
    let unknown: ApiError = PriceSourceError::UnknownSymbol("ABC".into()).into();
    assert!(matches!(unknown, ApiError::Validation(_)));
    let down: ApiError = PriceSourceError::SourceUnavailable("503".into()).into();
    assert!(matches!(down, ApiError::Upstream(_)));
  }
}
