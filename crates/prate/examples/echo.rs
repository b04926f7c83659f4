//! Echo service.
//!
//! ```text
//! PRATE__SERVER__HTTP_ADDR=127.0.0.1:5050 cargo run -p prate --example echo
//! ```
//!
//! `GET /:name` replies with `{key: "name", value: <name>}`; `POST /:name`
//! takes `{key, value}` and replies with `{key, "<value> - <name>"}`.

use prate::prelude::*;

#[derive(Clone, PartialEq, prost::Message)]
struct Pair {
    #[prost(string, tag = "1")]
    key: String,
    #[prost(string, tag = "2")]
    value: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::new()
        .with_development()
        .with_dotenv()?
        .with_optional_file("prate.toml")?
        .with_env_prefix("PRATE")
        .load()?;
    init_logging(&config.logging)?;

    let mut app = config.app();
    app.apply([builtin::request_id(), builtin::access_log()])?;

    app.get(EndpointConfig::new(
        "/:name",
        handler_fn(|_rc, rd| {
            let value = rd.param("name").unwrap_or_default().to_string();
            Box::pin(async move {
                reply(Pair {
                    key: "name".to_string(),
                    value,
                })
            })
        }),
    ));
    app.post(
        EndpointConfig::new(
            "/:name",
            handler_fn(|_rc, rd| {
                let name = rd.param("name").unwrap_or_default().to_string();
                let pair = rd.body::<Pair>().cloned().unwrap_or_default();
                Box::pin(async move {
                    reply(Pair {
                        key: pair.key,
                        value: format!("{} - {name}", pair.value),
                    })
                })
            }),
        )
        .with_request_payload_type::<Pair>()
        .with_exclude([builtin::ACCESS_LOG]),
    );

    tracing::info!(addr = %config.server.http_addr, "starting echo service");
    app.start().await?;
    Ok(())
}
