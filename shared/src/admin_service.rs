use crate::http::make_boxed_error_response;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

/// Liveness and readiness probes, served apart from the public API so that
/// orchestrators never compete with clients for the same listener.
///
/// `/health` answers as long as the process accepts connections, `/ready`
/// consults `is_ready` on every request.
pub struct AdminService<F, E> {
    is_ready: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> AdminService<F, E>
where
    F: Fn() -> bool,
{
    pub fn new(is_ready: F) -> Self {
        Self {
            is_ready,
            _error: PhantomData,
        }
    }
}

impl<F, E, B> Service<Request<B>> for AdminService<F, E>
where
    F: Fn() -> bool,
    E: Send + 'static,
{
    type Response = Response<BoxBody<Bytes, E>>;
    type Error = E;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let response = if req.method() != Method::GET {
            make_boxed_error_response(StatusCode::NOT_FOUND)
        } else {
            match req.uri().path() {
                "/health" => ok_response(),
                "/ready" if (self.is_ready)() => ok_response(),
                "/ready" => {
                    tracing::warn!("readiness probe failed");
                    make_boxed_error_response(StatusCode::SERVICE_UNAVAILABLE)
                }
                _ => make_boxed_error_response(StatusCode::NOT_FOUND),
            }
        };

        Box::pin(async move { Ok(response) })
    }
}

fn ok_response<E: 'static>() -> Response<BoxBody<Bytes, E>> {
    Response::new(Full::new(Bytes::from("ok\n")).map_err(|e| match e {}).boxed())
}
