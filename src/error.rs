use log::error;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use warp::{
    http::StatusCode,
    reject::Reject,
    reply::{self, Reply},
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("User not found")]
    NotFound,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Too many attempts. Please try again in {minutes} minutes.")]
    RateLimited { minutes: u64 },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::IncorrectPassword => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Reject for ApiError {}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ErrorReply {
    pub success: bool,
    pub error: String,
}

pub fn error_reply(message: impl Into<String>, status: StatusCode) -> reply::Response {
    let reply = ErrorReply {
        success: false,
        error: message.into(),
    };

    reply::with_status(reply::json(&reply), status).into_response()
}

impl Reply for ApiError {
    fn into_response(self) -> reply::Response {
        (&self).into_response()
    }
}

impl Reply for &ApiError {
    fn into_response(self) -> reply::Response {
        if let ApiError::Internal(err) = self {
            error!("Request failed: {:#}", err);
        }

        error_reply(self.to_string(), self.status())
    }
}
