//! Async HTTP helper for JSON APIs.
//!
//! # Overview
//! An endpoint issues GET/POST/PUT/DELETE calls against a base URL, with
//! headers declared inline through a configure closure. Each call awaits a
//! callback-style transport through a single-resume bridge and yields an
//! `HttpResponse` offering success/error branching and typed JSON decoding.
//!
//! ```ignore
//! use http_routines::{Endpoint, HttpEndpoint};
//!
//! let items = Endpoint::new("http://127.0.0.1:3000")?;
//! items
//!     .get("items/1", |r| {
//!         r.header("Accept", "application/json");
//!     })
//!     .await?
//!     .on_success::<Item, _>(|_, _, item| println!("{item:?}"))
//!     .on_error(|status, _| eprintln!("failed with {status}"));
//! ```
//!
//! # Design
//! - Two error channels: transport failures are the `Err` of the awaited
//!   call, non-2xx statuses are ordinary responses routed to `on_error`.
//! - Cancelling means dropping the future; the in-flight transport call is
//!   aborted and nothing it reports afterwards is observed.
//! - Retries, pooling and caching are left to the transport.

pub mod bridge;
pub mod builder;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;

pub use builder::RequestBuilder;
pub use config::EndpointConfig;
pub use endpoint::{Endpoint, HttpEndpoint};
pub use error::{HttpError, HttpResult};
pub use crate::http::{Headers, Method, RawResponse, Request};
pub use response::HttpResponse;
pub use transport::{Call, Completion, ReqwestTransport, Transport, UreqTransport};
