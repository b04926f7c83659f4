//! End-to-end dispatch through a bound server, without a socket.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use prate_core::{codec, handler_fn, reply, reply_empty, Error, HandlerResult};
use prate_middleware::Middleware;
use prate_server::{App, EndpointConfig, HttpResponse, Server, ServerConfig};

#[derive(Clone, PartialEq, prost::Message)]
struct KeyValue {
    #[prost(string, tag = "1")]
    key: String,
    #[prost(string, tag = "2")]
    value: String,
}

fn kv(key: &str, value: &str) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

async fn send(server: &Server, method: Method, uri: &str, body: Vec<u8>) -> HttpResponse {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(Bytes::from(body)))
        .unwrap();
    server.handle(req, "10.0.0.1:443".parse().ok()).await
}

async fn body_of(response: HttpResponse) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn echo_app() -> App {
    let mut app = App::new(ServerConfig::default());
    app.get(EndpointConfig::new(
        "/:name",
        handler_fn(|_rc, rd| {
            let name = rd.param("name").unwrap_or_default().to_string();
            Box::pin(async move { reply(kv("name", &name)) })
        }),
    ));
    app
}

fn store_app() -> App {
    let mut app = App::new(ServerConfig::default());
    app.post(
        EndpointConfig::new(
            "/store",
            handler_fn(|_rc, rd| {
                let stored = rd.body::<KeyValue>().cloned().unwrap_or_default();
                Box::pin(async move { reply(kv(&stored.value, &stored.key)) })
            }),
        )
        .with_request_payload_type::<KeyValue>(),
    );
    app
}

#[tokio::test]
async fn test_echo_path_param() {
    let server = echo_app().bind().unwrap();
    let response = send(&server, Method::GET, "/sarkar", Vec::new()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[CONTENT_TYPE],
        "application/vnd.google.protobuf"
    );
    let decoded: KeyValue = codec::decode(&body_of(response).await).unwrap();
    assert_eq!(decoded, kv("name", "sarkar"));
}

#[tokio::test]
async fn test_payload_is_decoded() {
    let server = store_app().bind().unwrap();
    let body = codec::encode(&kv("k", "v")).unwrap();
    let response = send(&server, Method::POST, "/store", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let decoded: KeyValue = codec::decode(&body_of(response).await).unwrap();
    assert_eq!(decoded, kv("v", "k"));
}

#[tokio::test]
async fn test_empty_payload_is_rejected() {
    let server = store_app().bind().unwrap();
    let response = send(&server, Method::POST, "/store", Vec::new()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(body_of(response).await, "empty payload");
}

#[tokio::test]
async fn test_invalid_payload_is_rejected() {
    let server = store_app().bind().unwrap();
    let response = send(&server, Method::POST, "/store", vec![0x0a, 0xff]).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_of(response).await, "invalid payload");
}

#[tokio::test]
async fn test_payload_instances_are_recycled_clean() {
    let server = store_app().bind().unwrap();

    let first = codec::encode(&kv("first-key", "first-value")).unwrap();
    send(&server, Method::POST, "/store", first).await;
    assert_eq!(server.endpoints()[0].idle_payloads(), 1);

    // Only `key` is set on the wire, so a dirty instance would leak `value`.
    let second = codec::encode(&kv("second-key", "")).unwrap();
    let response = send(&server, Method::POST, "/store", second).await;
    let decoded: KeyValue = codec::decode(&body_of(response).await).unwrap();
    assert_eq!(decoded, kv("", "second-key"));
}

#[tokio::test]
async fn test_handler_write_suppresses_encoding() {
    let mut app = App::new(ServerConfig::default());
    app.get(EndpointConfig::new(
        "/raw",
        handler_fn(|rc, _rd| {
            let writer = rc.response_writer();
            writer.write_header(StatusCode::ACCEPTED);
            let written = writer.write(b"raw body").map(|_| ());
            Box::pin(async move {
                written?;
                reply(kv("ignored", "ignored"))
            })
        }),
    ));
    let server = app.bind().unwrap();

    let response = send(&server, Method::GET, "/raw", Vec::new()).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(response.headers().get(CONTENT_TYPE).is_none());
    assert_eq!(body_of(response).await, "raw body");
}

#[tokio::test]
async fn test_empty_reply_is_empty_200() {
    let mut app = App::new(ServerConfig::default());
    app.delete(EndpointConfig::new(
        "/items/:id",
        handler_fn(|_rc, _rd| Box::pin(async { reply_empty() })),
    ));
    let server = app.bind().unwrap();

    let response = send(&server, Method::DELETE, "/items/4", Vec::new()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(CONTENT_TYPE).is_none());
    assert!(body_of(response).await.is_empty());
}

#[tokio::test]
async fn test_domain_error_status_and_body() {
    let mut app = App::new(ServerConfig::default());
    app.get(EndpointConfig::new(
        "/conflict",
        handler_fn(|_rc, _rd| {
            Box::pin(async {
                let result: HandlerResult =
                    Err(Error::with_message(StatusCode::CONFLICT, ["stale", "reload"]).into());
                result
            })
        }),
    ));
    app.get(EndpointConfig::new(
        "/opaque",
        handler_fn(|_rc, _rd| {
            Box::pin(async {
                let result: HandlerResult = Err(anyhow::anyhow!("database unreachable"));
                result
            })
        }),
    ));
    let server = app.bind().unwrap();

    let response = send(&server, Method::GET, "/conflict", Vec::new()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_of(response).await, "stale\nreload");

    let response = send(&server, Method::GET, "/opaque", Vec::new()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_of(response).await, "Internal Server Error");
}

#[tokio::test]
async fn test_request_objects_return_to_pools() {
    let server = echo_app().bind().unwrap();
    for name in ["a", "b", "c"] {
        send(&server, Method::GET, &format!("/{name}"), Vec::new()).await;
    }
    // Sequential requests reuse one instance of each.
    assert_eq!(server.idle_contexts(), 1);
    assert_eq!(server.idle_request_data(), 1);
}

#[tokio::test]
async fn test_custom_data_does_not_leak_between_requests() {
    let mut app = App::new(ServerConfig::default());
    app.apply([Middleware::from_fn("tag", |rc, rd, next| {
        if rc.headers().contains_key("x-tag") {
            rd.set_custom("tagged", true);
        }
        Box::pin(async move { next.call(rc, rd).await })
    })])
    .unwrap();
    app.get(EndpointConfig::new(
        "/tagged",
        handler_fn(|rc, rd| {
            let tagged = rd.contains_custom("tagged");
            rc.response_writer().headers().insert(
                "x-tagged",
                HeaderValue::from_static(if tagged { "yes" } else { "no" }),
            );
            Box::pin(async { reply_empty() })
        }),
    ));
    let server = app.bind().unwrap();

    let tagged = Request::builder()
        .uri("/tagged")
        .header("x-tag", "1")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = server.handle(tagged, None).await;
    assert_eq!(response.headers()["x-tagged"], "yes");

    let response = send(&server, Method::GET, "/tagged", Vec::new()).await;
    assert_eq!(response.headers()["x-tagged"], "no");
}

#[tokio::test]
async fn test_middleware_order_and_exclusion() {
    fn appender(id: &'static str, value: &'static str) -> Middleware {
        Middleware::from_fn(id, move |rc, rd, next| {
            Box::pin(async move {
                let result = next.call(rc, rd).await;
                rc.response_writer()
                    .headers()
                    .append("x-stack", HeaderValue::from_static(value));
                result
            })
        })
    }

    let mut app = App::new(ServerConfig::default());
    let noop = handler_fn(|_rc, _rd| Box::pin(async { reply_empty() }));
    app.get(EndpointConfig::new("/both", noop.clone()));
    app.get(EndpointConfig::new("/only-b", noop).with_exclude(["A"]));
    // Applied after registration; still wraps both endpoints.
    app.apply([appender("A", "fire"), appender("B", "colada")])
        .unwrap();
    let server = app.bind().unwrap();

    let stack = |response: &HttpResponse| -> Vec<String> {
        response
            .headers()
            .get_all("x-stack")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    };

    let response = send(&server, Method::GET, "/both", Vec::new()).await;
    assert_eq!(stack(&response), ["colada", "fire"]);

    let response = send(&server, Method::GET, "/only-b", Vec::new()).await;
    assert_eq!(stack(&response), ["colada"]);
}

#[tokio::test]
async fn test_client_ip_from_peer_and_headers() {
    let mut app = App::new(ServerConfig::default());
    app.get(EndpointConfig::new(
        "/ip",
        handler_fn(|rc, _rd| {
            let ip = rc.ip();
            Box::pin(async move { reply(kv("ip", &ip)) })
        }),
    ));
    let server = app.bind().unwrap();

    let response = send(&server, Method::GET, "/ip", Vec::new()).await;
    let decoded: KeyValue = codec::decode(&body_of(response).await).unwrap();
    assert_eq!(decoded.value, "10.0.0.1");

    let forwarded = Request::builder()
        .uri("/ip")
        .header("x-forwarded-for", "1.2.3.4, 5.6.7.8")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = server.handle(forwarded, "10.0.0.1:443".parse().ok()).await;
    let decoded: KeyValue = codec::decode(&body_of(response).await).unwrap();
    assert_eq!(decoded.value, "1.2.3.4");
}

#[tokio::test]
async fn test_handler_timeout() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let config = ServerConfig::builder()
        .write_timeout(Some(Duration::from_millis(20)))
        .build();
    let mut app = App::new(config);
    app.get(EndpointConfig::new(
        "/slow",
        handler_fn(move |_rc, _rd| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                reply_empty()
            })
        }),
    ));
    let server = app.bind().unwrap();

    let response = send(&server, Method::GET, "/slow", Vec::new()).await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
