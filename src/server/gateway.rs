//! Gateway request pipeline
//!
//! Ties classification, access control, planning and forwarding together
//! for a single request. The gateway holds only immutable state and is
//! shared across requests behind an `Arc`.

use crate::access_control::AccessResolver;
use crate::classifier::{classify, normalize_target};
use crate::config::AppConfig;
use crate::error::{ForwardError, ForwardResult, Result};
use crate::forwarder::response::forbidden;
use crate::forwarder::{Forwarder, ProxyRequest, declared_length, found, server_error};
use crate::planner::{Plan, RedirectPlanner};
use axum::body::{Body, to_bytes};
use axum::http::header::TRANSFER_ENCODING;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use tracing::{debug, info, instrument};

/// Gateway state shared by all requests
#[derive(Debug)]
pub struct Gateway {
    access: AccessResolver,
    planner: RedirectPlanner,
    forwarder: Forwarder,
    max_replay_body: usize,
}

impl Gateway {
    /// Create a new gateway from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let access = AccessResolver::new(&config.access_control)?;
        let planner = RedirectPlanner::new(config.proxy.jsdelivr);
        let forwarder = Forwarder::new(&config.proxy)?;

        info!(
            jsdelivr = config.proxy.jsdelivr,
            chunk_size = config.proxy.chunk_size,
            size_limit = config.proxy.size_limit,
            max_redirects = config.proxy.max_redirects,
            max_replay_body = config.proxy.max_replay_body,
            whitelist = config.access_control.whitelist.len(),
            blacklist = config.access_control.blacklist.len(),
            pass_list = config.access_control.pass_list.len(),
            "Initialized gateway"
        );

        Ok(Self {
            access,
            planner,
            forwarder,
            max_replay_body: config.proxy.max_replay_body,
        })
    }

    /// Plan the response for a request path and query, without any I/O
    pub fn resolve(&self, path: &str, query: Option<&str>) -> Plan {
        let url = normalize_target(&decode_path(path));

        let Some(matched) = classify(&url) else {
            debug!(%url, "No URL shape matched");
            return Plan::invalid_input();
        };

        let decision = self.access.evaluate(matched.groups());
        let plan = self.planner.plan(&url, &matched, decision, query);
        debug!(
            %url,
            shape = %matched.shape(),
            author = matched.author(),
            repo = matched.repo(),
            ?decision,
            ?plan,
            "Planned request"
        );
        plan
    }

    /// Serve one client request
    #[instrument(skip(self, uri, headers, body), fields(path = %uri.path()))]
    pub async fn handle(&self, method: Method, uri: Uri, headers: HeaderMap, body: Body) -> Response {
        match self.resolve(uri.path(), uri.query()) {
            Plan::Forbidden(message) => forbidden(message),
            Plan::Redirect(location) => found(&location),
            Plan::Proceed(target) => match self.proxy_request(method, &headers, body).await {
                Ok(request) => self.forwarder.forward(&target, request).await,
                Err(e) => server_error(&e),
            },
        }
    }

    /// Buffer small bodies so redirects can resend them, stream the rest
    async fn proxy_request(
        &self,
        method: Method,
        headers: &HeaderMap,
        body: Body,
    ) -> ForwardResult<ProxyRequest> {
        if !fits_replay_buffer(headers, self.max_replay_body) {
            debug!("Streaming request body upstream");
            return Ok(ProxyRequest::streaming(method, headers, body));
        }

        let bytes = to_bytes(body, self.max_replay_body)
            .await
            .map_err(|e| ForwardError::RequestBody(e.to_string()))?;
        Ok(ProxyRequest::new(method, headers, bytes))
    }
}

/// A declared length within `limit`, or no body at all
fn fits_replay_buffer(headers: &HeaderMap, limit: usize) -> bool {
    match declared_length(headers) {
        Some(length) => length <= limit as u64,
        None => !headers.contains_key(TRANSFER_ENCODING),
    }
}

/// Percent-decode the request path, keeping it as-is when not valid UTF-8
fn decode_path(path: &str) -> String {
    urlencoding::decode(path)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
