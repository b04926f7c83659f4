//! Ready-made middlewares.
//!
//! ## Request IDs
//!
//! [`request_id`] gives every request a UUID v7, stores it in the request
//! data under [`REQUEST_ID_KEY`] and echoes it in the `X-Request-ID`
//! response header. [`request_id_trusting`] reuses a valid incoming header
//! instead, which suits calls between internal services.
//!
//! ## Access log
//!
//! [`access_log`] emits a `tracing` event when a request starts and another
//! when it completes or fails, using the field names of
//! `prate_telemetry::logging::fields`.

use std::time::Instant;

use http::header::HeaderValue;
use http::{HeaderName, StatusCode};
use prate_core::{error_status, RequestCtx, RequestData};
use prate_telemetry::{log_request_complete, log_request_error, log_request_start};
use uuid::Uuid;

use crate::middleware::Middleware;

/// Header carrying the request ID.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request data key holding the request ID as a `String`.
pub const REQUEST_ID_KEY: &str = "request_id";

/// ID of the [`request_id`] middleware.
pub const REQUEST_ID: &str = "request_id";

/// ID of the [`access_log`] middleware.
pub const ACCESS_LOG: &str = "access_log";

/// Assigns a fresh request ID to every request.
#[must_use]
pub fn request_id() -> Middleware {
    request_id_middleware(false)
}

/// Like [`request_id`], but keeps a valid incoming `X-Request-ID`.
#[must_use]
pub fn request_id_trusting() -> Middleware {
    request_id_middleware(true)
}

fn request_id_middleware(trust_incoming: bool) -> Middleware {
    Middleware::from_fn(REQUEST_ID, move |rc, rd, next| {
        let id = incoming_request_id(rc, trust_incoming).unwrap_or_else(Uuid::now_v7);
        let id = id.to_string();

        if let (Some(writer), Ok(value)) = (rc.try_response_writer(), HeaderValue::from_str(&id)) {
            writer.headers().insert(REQUEST_ID_HEADER, value);
        }
        rd.set_custom(REQUEST_ID_KEY, id);

        Box::pin(async move { next.call(rc, rd).await })
    })
}

fn incoming_request_id(rc: &RequestCtx, trust_incoming: bool) -> Option<Uuid> {
    if !trust_incoming {
        return None;
    }
    rc.headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
}

/// The request ID stored by [`request_id`], if it ran.
#[must_use]
pub fn request_id_of(rd: &RequestData) -> Option<&str> {
    rd.custom::<String>(REQUEST_ID_KEY).map(String::as_str)
}

/// Logs the start and the outcome of every request.
///
/// Applied after [`request_id`], the events carry the request ID.
#[must_use]
pub fn access_log() -> Middleware {
    Middleware::from_fn(ACCESS_LOG, |rc, rd, next| {
        Box::pin(async move {
            let start = Instant::now();
            let id = request_id_of(rd).unwrap_or_default().to_string();
            log_request_start!(id, rc.method(), rc.path(), rc.ip());

            let result = next.call(rc, rd).await;
            let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

            match (&result, rc.status_code()) {
                (Err(err), status) => {
                    let status = status.unwrap_or_else(|| error_status(err).0);
                    log_request_error!(id, status.as_u16(), err);
                }
                (Ok(_), status) => {
                    let status = status.unwrap_or(StatusCode::OK);
                    log_request_complete!(id, status.as_u16(), duration_ms);
                }
            }

            result
        })
    })
}
