use std::task::{Context, Poll};

use crate::http::{Request, Response};

/// Turns a request into a response.
///
/// Workers block on the returned future, so implementations that do all their
/// work up front can hand back an already-completed one.
pub trait Service {
    /// The type of response returned by the service.
    type Response;
    /// The type of error that can occur within the service.
    type Error;
    /// The future type returned by the service.
    type Future: Future<Output = Result<Self::Response, Self::Error>>;

    /// Polls to check if the service is ready to accept a request.
    ///
    /// # Arguments
    ///
    /// * `cx` - The context of the current task.
    ///
    /// # Returns
    ///
    /// A `Poll` indicating if the service is ready or not.
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>>;

    /// Calls the service with a request.
    ///
    /// # Arguments
    ///
    /// * `request` - The parsed request to answer.
    ///
    /// # Returns
    ///
    /// A future resolving to the response or the service's error.
    fn call(&mut self, request: Request) -> Self::Future;
}

/// Wraps a service in another one.
pub trait Layer<S> {
    /// The type of service produced by the layer.
    type Service;

    fn layer(&self, service: S) -> Self::Service;
}

/// Stacks layers around an inner service; the last layer added is outermost.
pub struct ServiceBuilder<S> {
    service: S,
}

impl<S> ServiceBuilder<S> {
    pub fn new(service: S) -> Self {
        ServiceBuilder { service }
    }

    /// Adds a layer around the service built so far.
    ///
    /// # Arguments
    ///
    /// * `layer` - The layer to be added.
    ///
    /// # Returns
    ///
    /// A new `ServiceBuilder` wrapping the layered service.
    pub fn layer<L>(self, layer: L) -> ServiceBuilder<L::Service>
    where
        L: Layer<S>,
    {
        ServiceBuilder {
            service: layer.layer(self.service),
        }
    }

    pub fn build(self) -> S {
        self.service
    }
}

/// A service that handles requests using a function.
#[derive(Clone)]
pub struct HandlerService<F> {
    f: F,
}

impl<F, Fut, E> Service for HandlerService<F>
where
    F: FnMut(Request) -> Fut,
    Fut: Future<Output = Result<Response, E>>,
{
    type Response = Response;
    type Error = E;
    type Future = Fut;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        (self.f)(request)
    }
}

/// Creates a new `HandlerService` with the given function.
///
/// # Arguments
///
/// * `f` - Called once per request; its future is the response.
///
/// # Returns
///
/// A new `HandlerService` instance.
pub fn service_fn<F, Fut, E>(f: F) -> HandlerService<F>
where
    F: FnMut(Request) -> Fut,
    Fut: Future<Output = Result<Response, E>>,
{
    HandlerService { f }
}
