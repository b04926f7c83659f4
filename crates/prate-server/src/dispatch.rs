//! Per-request pipeline.
//!
//! ```text
//! RequestData ─▶ decode body ─▶ RequestCtx ─▶ handler chain ─▶ encode reply
//!      │            │ 400                                         │
//!      └────────────┴──────────── released to pools ◀────────────┘
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::upgrade::OnUpgrade;
use prate_core::{
    error_status, BoxedHandler, BufferedSink, ContentType, DispatchError, Params, Payload, Pool,
    RequestCtx, RequestData, ResponseWriter,
};

use crate::endpoint::PayloadPool;

/// Pools shared by every endpoint of a server.
#[derive(Debug, Default)]
pub(crate) struct RequestPools {
    pub(crate) contexts: Pool<RequestCtx>,
    pub(crate) data: Pool<RequestData>,
}

/// Limits applied while dispatching.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Limits {
    pub(crate) read: Option<Duration>,
    pub(crate) handler: Option<Duration>,
}

/// One request on its way through the pipeline.
pub(crate) struct Dispatch<'a> {
    pub(crate) handler: &'a BoxedHandler,
    pub(crate) payload: Option<&'a PayloadPool>,
    pub(crate) pools: &'a RequestPools,
    pub(crate) limits: Limits,
}

impl Dispatch<'_> {
    pub(crate) async fn run<B>(
        self,
        mut req: Request<B>,
        remote_addr: Option<SocketAddr>,
        params: Params,
    ) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: std::fmt::Display,
    {
        let mut rd = self.pools.data.acquire();
        rd.set_params(params);

        let on_upgrade = req.extensions_mut().remove::<OnUpgrade>();
        let (head, body) = req.into_parts();

        if let Some(pool) = self.payload {
            let mut payload = pool.take();
            if let Err(err) = read_payload(body, payload.as_mut(), self.limits.read).await {
                pool.release(payload);
                tracing::warn!(path = head.uri.path(), error = %err, "rejected request body");
                return text_response(err.status_code(), err.to_string());
            }
            rd.set_body(payload);
        }

        let sink = match on_upgrade {
            Some(on_upgrade) => BufferedSink::with_upgrade(on_upgrade),
            None => BufferedSink::new(),
        };
        let mut rc = self.pools.contexts.acquire();
        rc.bind(head, remote_addr, ResponseWriter::new(sink));

        let outcome = within(self.limits.handler, self.handler.call(&rc, &mut rd)).await;

        if let (Some(pool), Some(payload)) = (self.payload, rd.take_body()) {
            pool.release(payload);
        }

        let Some(writer) = rc.take_writer() else {
            return text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            );
        };

        match outcome {
            Some(Ok(reply)) => {
                if !writer.is_written() {
                    write_reply(&writer, reply.as_deref());
                }
            }
            Some(Err(err)) => {
                let (status, body) = error_status(&err);
                tracing::debug!(status = status.as_u16(), error = %err, "handler failed");
                write_error(&writer, status, &body);
            }
            None => {
                tracing::warn!(path = rc.path(), "handler timed out");
                if !writer.is_written() {
                    write_error(&writer, StatusCode::GATEWAY_TIMEOUT, "Gateway Timeout");
                }
            }
        }

        writer.into_response()
    }
}

/// Reads the whole body and decodes it into `payload`.
async fn read_payload<B>(
    body: B,
    payload: &mut dyn Payload,
    limit: Option<Duration>,
) -> Result<(), DispatchError>
where
    B: Body<Data = Bytes> + Send,
    B::Error: std::fmt::Display,
{
    let bytes = match within(limit, body.collect()).await {
        Some(Ok(collected)) => collected.to_bytes(),
        Some(Err(err)) => {
            tracing::debug!(error = %err, "request body read failed");
            return Err(DispatchError::Connection);
        }
        None => {
            tracing::debug!("request body read timed out");
            return Err(DispatchError::Connection);
        }
    };

    if bytes.is_empty() {
        return Err(DispatchError::EmptyPayload);
    }
    payload.merge_payload(&bytes).map_err(|err| {
        tracing::debug!(error = %err, "request unmarshal failed");
        DispatchError::InvalidPayload
    })
}

/// Encodes the handler's reply, or writes an empty 200 when there is none.
fn write_reply(writer: &ResponseWriter, reply: Option<&dyn Payload>) {
    let body = match reply.map(|payload| payload.encode_payload()).transpose() {
        Ok(body) => body,
        Err(err) => {
            tracing::error!(error = %err, "response marshal failed");
            let err = anyhow::Error::new(DispatchError::Encode);
            let (status, body) = error_status(&err);
            write_error(writer, status, &body);
            return;
        }
    };

    if body.is_some() {
        writer
            .headers()
            .insert(CONTENT_TYPE, ContentType::PROTO.header_value());
    }
    writer.write_header(StatusCode::OK);
    if let Some(body) = body {
        if let Err(err) = writer.write(&body) {
            tracing::error!(error = %err, "response write failed");
        }
    }
}

fn write_error(writer: &ResponseWriter, status: StatusCode, body: &str) {
    writer.write_header(status);
    if let Err(err) = writer.write(body.as_bytes()) {
        tracing::error!(error = %err, "response write failed");
    }
}

/// A complete `text/plain` response.
pub(crate) fn text_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, ContentType::TEXT.header_value());
    response
}

/// Runs `fut`, giving up after `limit`. `None` means it timed out.
pub(crate) async fn within<F: Future>(limit: Option<Duration>, fut: F) -> Option<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
        None => Some(fut.await),
    }
}
