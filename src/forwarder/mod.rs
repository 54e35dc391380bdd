//! Streaming forwarder
//!
//! Issues the upstream request and relays the response to the client
//! without buffering the body. Upstream redirects are resolved in a bounded
//! loop: a `Location` that matches a supported shape is handed back to the
//! client through the gateway's own path, anything else is fetched by the
//! next hop. A request whose body was streamed cannot be resent, so its
//! redirects are handed to the client instead.

pub mod response;
pub mod stream;

use crate::classifier::{classify, repair_scheme};
use crate::config::ProxyConfig;
use crate::error::{ForwardError, ForwardResult};
use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, HOST, LOCATION};
use axum::http::{HeaderMap, HeaderValue, Method};
use axum::response::Response;
use bytes::Bytes;
use reqwest::{Client, Proxy, Url, redirect};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

pub use response::{ERROR_CONTENT_TYPE, found, server_error};
pub use stream::rechunk;

/// Client request body as handed to the upstream
#[derive(Debug)]
enum RequestBody {
    /// Held in memory and resent on every hop
    Buffered(Bytes),
    /// Sent once on the first hop; `None` after it has been taken
    Streaming(Option<Body>),
}

/// Client request forwarded to the upstream
#[derive(Debug)]
pub struct ProxyRequest {
    method: Method,
    headers: HeaderMap,
    body: RequestBody,
}

impl ProxyRequest {
    /// Build from the client's request with a fully read body
    ///
    /// `Host` and connection-scoped headers are dropped; `Content-Length`
    /// is recomputed from the replayed body.
    pub fn new(method: Method, headers: &HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            headers: forwarded_headers(headers),
            body: RequestBody::Buffered(body),
        }
    }

    /// Build from the client's request, streaming its body upstream
    ///
    /// The body is not kept, so only the first hop can carry it.
    pub fn streaming(method: Method, headers: &HeaderMap, body: Body) -> Self {
        Self {
            method,
            headers: forwarded_headers(headers),
            body: RequestBody::Streaming(Some(body)),
        }
    }

    /// Whether the request can be resent to a followed redirect
    pub fn is_replayable(&self) -> bool {
        matches!(self.body, RequestBody::Buffered(_))
    }

    fn take_body(&mut self) -> Option<reqwest::Body> {
        match &mut self.body {
            RequestBody::Buffered(bytes) if bytes.is_empty() => None,
            RequestBody::Buffered(bytes) => Some(reqwest::Body::from(bytes.clone())),
            RequestBody::Streaming(body) => body
                .take()
                .map(|body| reqwest::Body::wrap_stream(body.into_data_stream())),
        }
    }
}

fn forwarded_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = response::end_to_end_headers(headers);
    headers.remove(HOST);
    headers.remove(CONTENT_LENGTH);
    headers
}

/// Upstream forwarder
///
/// Holds a pooled HTTP client in raw passthrough mode: it never follows
/// redirects on its own and never decodes content encodings.
#[derive(Debug, Clone)]
pub struct Forwarder {
    http: Client,
    chunk_size: usize,
    size_limit: u64,
    max_redirects: u32,
}

impl Forwarder {
    /// Create a forwarder from configuration
    pub fn new(config: &ProxyConfig) -> ForwardResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let mut builder = Client::builder()
            .redirect(redirect::Policy::none())
            .no_gzip()
            .no_brotli()
            .no_deflate()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90));

        if let Some(proxy) = &config.upstream_proxy {
            builder = builder.proxy(Proxy::all(proxy.as_str())?);
        }

        Ok(Self {
            http: builder.build()?,
            chunk_size: config.chunk_size,
            size_limit: config.size_limit,
            max_redirects: config.max_redirects,
        })
    }

    /// Forward a request to `target`, answering failures with 500
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn forward(&self, target: &str, request: ProxyRequest) -> Response {
        match self.resolve(target, request).await {
            Ok(response) => response,
            Err(e) => {
                error!(url = target, error = %e, "Upstream request failed");
                server_error(&e)
            }
        }
    }

    async fn resolve(&self, target: &str, mut request: ProxyRequest) -> ForwardResult<Response> {
        let mut url = repair_scheme(target);

        for hop in 0..=self.max_redirects {
            let upstream = self.send(&url, &mut request).await?;
            let status = upstream.status();
            debug!(hop, %url, status = status.as_u16(), "Upstream responded");

            if let Some(length) = declared_length(upstream.headers())
                && length > self.size_limit
            {
                debug!(length, limit = self.size_limit, "Over size limit, redirecting client");
                return Ok(found(&url));
            }

            let Some(location) = upstream_location(upstream.headers(), &url)? else {
                return Ok(self.relay(upstream, None));
            };

            if classify(&location).is_some() {
                debug!(%location, "Routing upstream redirect back through the gateway");
                let rewritten = format!("/{}", location);
                return Ok(self.relay(upstream, Some(&rewritten)));
            }

            if !request.is_replayable() {
                debug!(%location, "Request body already streamed, handing redirect to the client");
                return Ok(self.relay(upstream, Some(&location)));
            }

            debug!(hop, %location, "Following upstream redirect");
            url = location;
        }

        warn!(limit = self.max_redirects, "Redirect limit reached");
        Err(ForwardError::TooManyRedirects {
            limit: self.max_redirects,
        })
    }

    async fn send(&self, url: &str, request: &mut ProxyRequest) -> ForwardResult<reqwest::Response> {
        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(request.headers.clone());

        if let Some(body) = request.take_body() {
            builder = builder.body(body);
        }

        Ok(builder.send().await?)
    }

    fn relay(&self, upstream: reqwest::Response, location: Option<&str>) -> Response {
        let status = upstream.status();
        let mut headers = response::end_to_end_headers(upstream.headers());

        if let Some(location) = location {
            match HeaderValue::from_str(location) {
                Ok(value) => {
                    headers.insert(LOCATION, value);
                }
                Err(e) => return server_error(&ForwardError::invalid_location(location, e)),
            }
        }

        let body = Body::from_stream(rechunk(upstream.bytes_stream(), self.chunk_size));
        response::relayed(status, headers, body)
    }
}

/// Content length declared in a header map, if any
pub fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Absolute redirect target, resolving relative locations against `current`
fn upstream_location(headers: &HeaderMap, current: &str) -> ForwardResult<Option<String>> {
    let Some(value) = headers.get(LOCATION) else {
        return Ok(None);
    };

    let location = value
        .to_str()
        .map_err(|e| ForwardError::invalid_location(String::from_utf8_lossy(value.as_bytes()), e))?;

    if Url::parse(location).is_ok() {
        return Ok(Some(location.to_string()));
    }

    let base = Url::parse(current).map_err(|e| ForwardError::invalid_location(current, e))?;
    let joined = base
        .join(location)
        .map_err(|e| ForwardError::invalid_location(location, e))?;
    Ok(Some(joined.to_string()))
}
