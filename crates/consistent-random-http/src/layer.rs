//! Tower layer that runs every request inside a consistent random scope.

use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::request::Parts;
use axum::http::{HeaderName, Request};
use consistent_random_core::{SeedInput, Scoped, enter};
use tower::{Layer, Service};
use tracing::debug;

type SeedExtractor = Arc<dyn Fn(&Parts) -> SeedInput + Send + Sync>;

/// Wraps each request in a scope.
///
/// Without an extractor every request gets a fresh seed. With one, the seed
/// is derived from the request head, so a client can replay a request and
/// observe the same values.
#[derive(Clone, Default)]
pub struct ConsistentRandomLayer {
    extractor: Option<SeedExtractor>,
}

impl ConsistentRandomLayer {
    /// A layer that gives every request a fresh scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A layer that seeds each request scope with `extractor`.
    #[must_use]
    pub fn with_seed<F>(extractor: F) -> Self
    where
        F: Fn(&Parts) -> SeedInput + Send + Sync + 'static,
    {
        Self {
            extractor: Some(Arc::new(extractor)),
        }
    }

    /// A layer that seeds each request scope with the value of `header`.
    /// Requests without the header, or with a non-text value, get a fresh
    /// scope.
    #[must_use]
    pub fn from_header(header: HeaderName) -> Self {
        Self::with_seed(move |parts| {
            parts
                .headers
                .get(&header)
                .and_then(|value| value.to_str().ok())
                .map_or(SeedInput::Absent, SeedInput::from)
        })
    }
}

impl fmt::Debug for ConsistentRandomLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsistentRandomLayer")
            .field("extractor", &self.extractor.is_some())
            .finish()
    }
}

impl<S> Layer<S> for ConsistentRandomLayer {
    type Service = ConsistentRandomService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ConsistentRandomService {
            inner,
            extractor: self.extractor.clone(),
        }
    }
}

/// Service produced by [`ConsistentRandomLayer`].
#[derive(Clone)]
pub struct ConsistentRandomService<S> {
    inner: S,
    extractor: Option<SeedExtractor>,
}

impl<S: fmt::Debug> fmt::Debug for ConsistentRandomService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsistentRandomService")
            .field("inner", &self.inner)
            .field("extractor", &self.extractor.is_some())
            .finish()
    }
}

impl<S, B> Service<Request<B>> for ConsistentRandomService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Scoped<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let (parts, body) = request.into_parts();
        let seed = self
            .extractor
            .as_ref()
            .map_or(SeedInput::Absent, |extract| extract(&parts));
        debug!(seeded = seed != SeedInput::Absent, "opening request scope");
        let request = Request::from_parts(parts, body);

        // The inner call and the response future share the same scope.
        let _guard = enter(seed);
        Scoped::new(SeedInput::Absent, self.inner.call(request))
    }
}
