//! Typed, parameterizable route templates.
//!
//! # Design
//! A `Route<T>` is a path template bound to an HTTP method and a response
//! type. It holds no state beyond that and is meant to be declared as a
//! `const`:
//!
//! ```
//! use rest_route::Route;
//! # #[derive(serde::Deserialize)] struct User;
//!
//! const GET_USER: Route<User> = Route::get("/users/%d");
//! ```
//!
//! Each invocation runs format → build → execute → decode on the calling
//! thread. The two pure halves are also exposed as [`Route::build_request`]
//! and [`Route::parse_response`] for callers that do their own I/O.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::decode::decode_json;
use crate::error::{BuildError, Error};
use crate::executor::Executor;
use crate::format::{self, FormatArg};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::request::build_request;
use crate::split::{self, Arg, Payload};

/// A path template bound to a method and a JSON response type `T`.
pub struct Route<T> {
    path: &'static str,
    method: HttpMethod,
    // fn() -> T keeps Route Send + Sync + Copy whatever T is.
    _response: PhantomData<fn() -> T>,
}

impl<T> Route<T> {
    pub const fn new(method: HttpMethod, path: &'static str) -> Self {
        Self {
            path,
            method,
            _response: PhantomData,
        }
    }

    pub const fn get(path: &'static str) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub const fn post(path: &'static str) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub const fn put(path: &'static str) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub const fn patch(path: &'static str) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub const fn delete(path: &'static str) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub const fn path(&self) -> &'static str {
        self.path
    }

    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Build the request without sending it.
    ///
    /// The template is formatted on its own and `base_url` is prepended
    /// verbatim afterwards, so a `%` in the base URL is never a specifier.
    pub fn build_request(
        &self,
        base_url: Option<&str>,
        substitutions: &[FormatArg],
        payload: Payload,
    ) -> Result<HttpRequest, BuildError> {
        let path = format::sprintf(self.path, substitutions)?;
        let url = match base_url {
            Some(base) => format!("{base}{path}"),
            None => path,
        };
        build_request(self.method, url, payload)
    }
}

impl<T: DeserializeOwned> Route<T> {
    /// Decode a response obtained for this route.
    pub fn parse_response(&self, response: HttpResponse) -> Result<T, serde_json::Error> {
        decode_json(response.body)
    }

    /// Invoke the route with path values and payload passed separately.
    pub fn call<E: Executor>(
        &self,
        executor: &E,
        substitutions: &[FormatArg],
        payload: Payload,
    ) -> Result<T, Error<E::Error>> {
        let request = self.build_request(executor.base_url(), substitutions, payload)?;
        tracing::debug!(method = %request.method, url = %request.url, "executing route");

        let response = executor.execute(request).map_err(Error::Execute)?;
        tracing::trace!(status = response.status, "decoding response");
        self.parse_response(response).map_err(Error::Decode)
    }

    /// Invoke the route with one mixed argument list.
    ///
    /// Leading arguments fill the template's conversion specifiers; the rest
    /// must be at most one [`Body`](crate::Body) and at most one
    /// [`Headers`](crate::Headers), in either order. If either kind is given
    /// more than once, the last one is used.
    ///
    /// # Panics
    ///
    /// Panics if a plain value follows the last specifier.
    pub fn dispatch<E: Executor>(&self, executor: &E, args: Vec<Arg>) -> Result<T, Error<E::Error>> {
        let (substitutions, payload) = split::split(self.path, args);
        let substitutions = substitutions
            .into_iter()
            .enumerate()
            .map(|(index, arg)| arg.into_format_arg(index))
            .collect::<Result<Vec<_>, _>>()
            .map_err(BuildError::from)?;
        self.call(executor, &substitutions, payload.into_iter().collect())
    }
}

impl<T> Clone for Route<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Route<T> {}

impl<T> fmt::Debug for Route<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("response", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> fmt::Display for Route<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
