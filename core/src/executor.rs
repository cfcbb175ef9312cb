//! The executor contract routes dispatch through.
//!
//! # Design
//! An executor sends one `HttpRequest` and returns the `HttpResponse`. How it
//! does that (TLS, redirects, timeouts, pooling, retries) is entirely its
//! business. The optional base URL is part of the same trait with a default
//! of `None`, so whether an executor prefixes routes is visible from its
//! type rather than discovered at runtime. [`WithBaseUrl`] attaches a base
//! URL to an executor that has none.

use std::sync::Arc;

use crate::http::{HttpRequest, HttpResponse};

pub trait Executor {
    type Error: std::error::Error + 'static;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error>;

    /// Prefix prepended to every formatted route path.
    fn base_url(&self) -> Option<&str> {
        None
    }
}

impl<E: Executor + ?Sized> Executor for &E {
    type Error = E::Error;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        (**self).execute(request)
    }

    fn base_url(&self) -> Option<&str> {
        (**self).base_url()
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    type Error = E::Error;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        (**self).execute(request)
    }

    fn base_url(&self) -> Option<&str> {
        (**self).base_url()
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    type Error = E::Error;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        (**self).execute(request)
    }

    fn base_url(&self) -> Option<&str> {
        (**self).base_url()
    }
}

/// An executor backed by a closure. See [`executor_fn`].
#[derive(Debug, Clone, Copy)]
pub struct ExecutorFn<F>(F);

/// Turn `f` into an [`Executor`] with no base URL.
pub fn executor_fn<F, E>(f: F) -> ExecutorFn<F>
where
    F: Fn(HttpRequest) -> Result<HttpResponse, E>,
    E: std::error::Error + 'static,
{
    ExecutorFn(f)
}

impl<F, E> Executor for ExecutorFn<F>
where
    F: Fn(HttpRequest) -> Result<HttpResponse, E>,
    E: std::error::Error + 'static,
{
    type Error = E;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, E> {
        (self.0)(request)
    }
}

/// Wraps an executor and supplies a fixed base URL.
#[derive(Debug, Clone)]
pub struct WithBaseUrl<E> {
    inner: E,
    base_url: String,
}

impl<E> WithBaseUrl<E> {
    pub fn new(inner: E, base_url: impl Into<String>) -> Self {
        Self {
            inner,
            base_url: base_url.into(),
        }
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Executor> Executor for WithBaseUrl<E> {
    type Error = E::Error;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        self.inner.execute(request)
    }

    fn base_url(&self) -> Option<&str> {
        Some(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, Headers};
    use std::convert::Infallible;

    fn echo_url() -> ExecutorFn<impl Fn(HttpRequest) -> Result<HttpResponse, Infallible>> {
        executor_fn(|req: HttpRequest| Ok(HttpResponse::ok(req.url)))
    }

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Headers::new(),
            body: None,
        }
    }

    #[test]
    fn closure_executor_has_no_base_url() {
        let exec = echo_url();
        assert_eq!(exec.base_url(), None);
        let resp = exec.execute(get("/a")).unwrap();
        assert_eq!(resp.body.read_to_string().unwrap(), "/a");
    }

    #[test]
    fn with_base_url_delegates_execution() {
        let exec = WithBaseUrl::new(echo_url(), "http://example.com");
        assert_eq!(exec.base_url(), Some("http://example.com"));
        let resp = exec.execute(get("/b")).unwrap();
        assert_eq!(resp.body.read_to_string().unwrap(), "/b");
    }

    #[test]
    fn into_inner_drops_the_base_url() {
        let exec = WithBaseUrl::new(echo_url(), "http://example.com").into_inner();
        assert_eq!(exec.base_url(), None);
        let resp = exec.execute(get("/c")).unwrap();
        assert_eq!(resp.body.read_to_string().unwrap(), "/c");
    }

    #[test]
    fn pointer_impls_forward_base_url() {
        let exec = WithBaseUrl::new(echo_url(), "http://example.com");
        assert_eq!((&exec).base_url(), Some("http://example.com"));
        let shared = Arc::new(exec);
        assert_eq!(shared.base_url(), Some("http://example.com"));
        let boxed: Box<dyn Executor<Error = Infallible>> = Box::new(echo_url());
        assert_eq!(boxed.base_url(), None);
    }
}
