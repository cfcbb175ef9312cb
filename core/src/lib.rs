//! Typed REST routes over any HTTP executor.
//!
//! # Overview
//! A [`Route<T>`] binds a printf-style path template to an HTTP method and a
//! JSON response type. Invoking it formats the path, builds an
//! [`HttpRequest`], hands it to an [`Executor`] and decodes the response body
//! into `T`. The executor is whatever the caller supplies: a closure, a plain
//! `ureq::Agent`, the bundled [`BearerTokenClient`], or a test double.
//!
//! ```no_run
//! use rest_route::{args, BearerTokenClient, Route};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! const GET_USER: Route<User> = Route::get("/users/%d");
//!
//! let client = BearerTokenClient::new("https://api.example.com", "token");
//! let user = GET_USER.dispatch(&client, args![3]).unwrap();
//! println!("{} {}", user.id, user.name);
//! ```
//!
//! # Design
//! - Routes are immutable `Copy` values with no shared state, so one `const`
//!   route can be used from any number of threads at once.
//! - Every invocation is a synchronous format → build → execute → decode
//!   sequence. Timeouts, retries and status handling belong to the executor.
//! - [`Route::call`] takes path values and payload as separate parameters;
//!   [`Route::dispatch`] takes one mixed list and splits it by position.

pub mod bearer;
pub mod decode;
pub mod error;
pub mod executor;
pub mod format;
pub mod http;
pub mod request;
pub mod route;
pub mod split;

pub use bearer::{BearerTokenClient, ClientConfig, ClientError, ConfigError};
pub use decode::decode_json;
pub use error::{BuildError, Error, FormatError};
pub use executor::{executor_fn, Executor, ExecutorFn, WithBaseUrl};
pub use format::{sprintf, FormatArg};
pub use http::{Body, Headers, HttpMethod, HttpRequest, HttpResponse};
pub use request::build_request;
pub use route::Route;
pub use split::{split, Arg, Payload, PayloadValue};
