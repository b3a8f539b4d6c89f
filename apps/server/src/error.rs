use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marketpulse_core::FeedError;
use marketpulse_market_data::MarketDataError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Feed(#[from] FeedError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unavailable(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Feed(e) => match e {
                FeedError::InvalidSymbol { .. } => StatusCode::BAD_REQUEST,
                FeedError::SourceUnavailable { .. }
                | FeedError::Pending { .. }
                | FeedError::NotTracked { .. } => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<MarketDataError> for ApiError {
    fn from(err: MarketDataError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
