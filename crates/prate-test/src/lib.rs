//! # prate test
//!
//! In-memory testing for prate applications: requests go through the bound
//! [`Server`](prate_server::Server) without binding a port.
//!
//! - [`TestClient`] binds an [`App`](prate_server::App) and sends requests
//! - [`TestRequestBuilder`] builds requests with raw or protobuf bodies
//! - [`TestResponse`] reads the response and offers assertions
//! - [`fixtures`] has small protobuf messages for handler tests
//!
//! ## Example
//!
//! ```ignore
//! use prate_test::{fixtures::{TestReq, TestRes}, TestClient};
//!
//! #[tokio::test]
//! async fn test_store() {
//!     let client = TestClient::new(app()).unwrap();
//!
//!     client
//!         .post("/store/sarkar")
//!         .proto(&TestReq::new("Key", "Value"))
//!         .send()
//!         .await
//!         .assert_status(http::StatusCode::OK)
//!         .assert_proto(&TestRes::new("Key", "Value - sarkar"));
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/prate-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
pub mod fixtures;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest, DEFAULT_REMOTE_ADDR};
pub use error::TestError;
pub use request::TestRequestBuilder;
pub use response::TestResponse;
