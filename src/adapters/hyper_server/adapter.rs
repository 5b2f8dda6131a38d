use http_body_util::{combinators::UnsyncBoxBody, BodyExt, Empty, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderMap, HeaderValue, CONTENT_TYPE, HOST};
use hyper::{Request, Response, Uri};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioIo};
use std::error::Error as StdError;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::connector::HyperConnector;
use super::hijack::hijack;
use crate::adapters::tunnel::Tunnel;
use crate::domain::{ProxyError, ProxyService, RequestKind, Result, TunnelTarget};

pub type Body = UnsyncBoxBody<Bytes, hyper::Error>;

pub struct HyperProxyAdapter {
    service: Arc<ProxyService>,
    client: Client<HyperConnector, Body>,
}

impl HyperProxyAdapter {
    pub fn new(service: Arc<ProxyService>) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .http1_title_case_headers(true)
            .http1_preserve_header_case(true)
            .build(HyperConnector::new(service.clone()));

        Self { service, client }
    }

    /// Dispatches on the method: `CONNECT` opens a tunnel, everything else is forwarded.
    pub async fn handle(&self, req: Request<Incoming>) -> Response<Body> {
        match RequestKind::of(req.method()) {
            RequestKind::Tunnel => self.handle_connect(req).await,
            RequestKind::Forward => self.handle_http(req).await,
        }
    }

    async fn handle_connect(&self, mut req: Request<Incoming>) -> Response<Body> {
        let span = info_span!(parent: self.service.span(), "tunnel", id = %Uuid::new_v4(), target = %req.uri());

        let target = match TunnelTarget::from_uri(req.uri()) {
            Ok(target) => target,
            Err(e) => {
                warn!(parent: &span, error = %e, "rejecting CONNECT");
                return error_response(&e);
            }
        };

        let destination = match self.service.dial(&target).await {
            Ok(stream) => stream,
            Err(e) => return error_response(&e),
        };

        let on_upgrade = match hijack(&mut req) {
            Ok(on_upgrade) => on_upgrade,
            Err(e) => {
                warn!(parent: &span, error = %e, "connection does not support hijacking");
                return error_response(&e);
            }
        };

        info!(parent: &span, "tunnel established");

        tokio::spawn(
            async move {
                match on_upgrade.await {
                    Ok(upgraded) => {
                        let span = tracing::Span::current();
                        Tunnel::new(TokioIo::new(upgraded), destination).run(span).await;
                    }
                    Err(e) => warn!("client connection was not handed over: {}", e),
                }
            }
            .instrument(span),
        );

        Response::new(empty())
    }

    async fn handle_http(&self, req: Request<Incoming>) -> Response<Body> {
        let req = match with_absolute_target(req) {
            Ok(req) => req.map(|body| body.boxed_unsync()),
            Err(e) => {
                warn!(parent: self.service.span(), error = %e, "cannot resolve forward target");
                return error_response(&e);
            }
        };

        let method = req.method().clone();
        let uri = req.uri().clone();

        match self.client.request(req).await {
            Ok(upstream) => {
                debug!(parent: self.service.span(), %method, %uri, status = %upstream.status(), "forwarded");
                relay_response(upstream)
            }
            Err(e) => {
                let err = upstream_error(&e);
                warn!(parent: self.service.span(), %method, %uri, error = %err, "forward failed");
                error_response(&err)
            }
        }
    }
}

/// Makes origin-form targets absolute using the `Host` header.
pub(crate) fn with_absolute_target<B>(req: Request<B>) -> Result<Request<B>> {
    if req.uri().authority().is_some() {
        return Ok(req);
    }

    let (mut parts, body) = req.into_parts();
    let host = parts
        .headers
        .get(HOST)
        .ok_or(ProxyError::MissingHost)?
        .to_str()
        .map_err(|e| ProxyError::InvalidTarget(format!("Invalid host header: {}", e)))?;
    let path = parts.uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    parts.uri = format!("http://{}{}", host, path)
        .parse::<Uri>()
        .map_err(|e| ProxyError::InvalidTarget(format!("{}", e)))?;

    Ok(Request::from_parts(parts, body))
}

fn relay_response(upstream: Response<Incoming>) -> Response<Body> {
    let (parts, body) = upstream.into_parts();

    let mut response = Response::new(body.boxed_unsync());
    *response.status_mut() = parts.status;
    copy_headers(response.headers_mut(), &parts.headers);
    response
}

/// Appends every value of every header; nothing in `dst` is overwritten.
pub fn copy_headers(dst: &mut HeaderMap, src: &HeaderMap) {
    for (name, value) in src {
        dst.append(name.clone(), value.clone());
    }
}

fn error_response(err: &ProxyError) -> Response<Body> {
    let mut response = Response::new(full(format!("{}\n", err)));
    *response.status_mut() = err.status_code();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
        .headers_mut()
        .insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    response
}

/// Recovers the proxy's own error when the client failed inside the
/// connector, so dial outcomes keep their status code.
fn upstream_error(err: &(dyn StdError + 'static)) -> ProxyError {
    let mut cause = Some(err);
    while let Some(current) = cause {
        if let Some(proxy_err) = current.downcast_ref::<ProxyError>() {
            return proxy_err.clone();
        }
        cause = current.source();
    }
    ProxyError::Upstream(error_chain(err))
}

fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn empty() -> Body {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed_unsync()
}

fn full<T: Into<Bytes>>(chunk: T) -> Body {
    Full::new(chunk.into()).map_err(|never| match never {}).boxed_unsync()
}
