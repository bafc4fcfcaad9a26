use log::debug;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use warp::{
    filters::body::BodyDeserializeError,
    http::StatusCode,
    reject::{self, LengthRequired, MethodNotAllowed, PayloadTooLarge},
    reply::Reply,
    Filter, Rejection,
};

use crate::controllers::AccountController;
use crate::error::{error_reply, ApiError};
use crate::limiter::{client_key, RateLimiter};

const MAX_BODY_BYTES: u64 = 16 * 1024;

pub fn with_controller(
    controller: AccountController,
) -> impl Filter<Extract = (AccountController,), Error = Infallible> + Clone {
    warp::any().map(move || controller.clone())
}

pub fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// Counts an attempt for the connecting address and rejects once the
/// address has used up its window.
pub fn rate_limited(limiter: RateLimiter) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::addr::remote()
        .and_then(move |remote| {
            let limiter = limiter.clone();
            async move {
                limiter
                    .check(client_key(remote))
                    .map_err(reject::custom)
            }
        })
        .untuple_one()
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    if let Some(err) = err.find::<ApiError>() {
        return Ok(err.into_response());
    }

    let response = if let Some(err) = err.find::<BodyDeserializeError>() {
        debug!("Rejected request body: {}", err);
        error_reply("Invalid request body", StatusCode::BAD_REQUEST)
    } else if err.find::<PayloadTooLarge>().is_some() {
        error_reply("Request body too large", StatusCode::PAYLOAD_TOO_LARGE)
    } else if err.find::<LengthRequired>().is_some() {
        error_reply("Content-Length required", StatusCode::LENGTH_REQUIRED)
    } else if err.find::<MethodNotAllowed>().is_some() {
        error_reply("Method not allowed", StatusCode::METHOD_NOT_ALLOWED)
    } else if err.is_not_found() {
        error_reply("Not found", StatusCode::NOT_FOUND)
    } else {
        debug!("Unhandled rejection: {:?}", err);
        error_reply("Bad request", StatusCode::BAD_REQUEST)
    };

    Ok(response)
}
