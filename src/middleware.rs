use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

use log::{info, warn};

use crate::http::{Request, Response};
use crate::service::{Layer, Service};

/// Middleware to log requests
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLayer;

impl<S> Layer<S> for LogLayer {
    type Service = LogMiddleware<S>;

    fn layer(&self, service: S) -> Self::Service {
        LogMiddleware { inner: service }
    }
}

/// Writes one access log line per request once the inner service answers.
#[derive(Clone)]
pub struct LogMiddleware<S> {
    inner: S,
}

impl<S> Service for LogMiddleware<S>
where
    S: Service<Response = Response> + Send,
    S::Error: Display + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let line = format!("{} {}", request.method, request.url);
        let future = self.inner.call(request);

        Box::pin(async move {
            let result = future.await;
            match &result {
                Ok(response) => info!(
                    "{} -> {} ({} bytes)",
                    line,
                    response.status_code.as_u16(),
                    response.content_length
                ),
                Err(e) => warn!("{} -> error: {}", line, e),
            }
            result
        })
    }
}
