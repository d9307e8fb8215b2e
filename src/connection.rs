//! Request orchestration.
//!
//! Wires the cookie jar, header parser, throttle, and transport into the
//! GET/POST/AJAX request cycle: attach cookies, merge per-call header
//! overrides over an immutable base set, execute, replay response header
//! lines into the parser, and follow redirects up to a configurable hop
//! ceiling. Every redirect is reissued as a GET with the original body
//! discarded, matching the sites this client was built against.

use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use thiserror::Error;
use tokio::time::sleep;

use crate::cookies::{CookieJar, CookieMap};
use crate::headers::{HeaderEvent, HeaderParser, ResponseHeaders, canonical_name};
use crate::throttle::Throttle;
use crate::transport::reqwest_client::ReqwestTransport;
use crate::transport::{RequestBody, Transport, TransportError, TransportRequest};
use crate::url::{UrlComponents, UrlError, encode_query};

/// Result alias used across the crate's request surface.
pub type GrabResult<T> = Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("url error: {0}")]
    Url(#[from] UrlError),
    #[error("redirect chain exceeded {0} hops")]
    TooManyRedirects(usize),
}

/// Default `Accept` sent on AJAX calls.
pub const AJAX_ACCEPT: &str = "application/json, text/javascript, */*";

const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Fixed base header set. `Expect` and `Pragma` are intentionally blank to
/// suppress proxy and cache side effects on the remote end.
fn base_headers() -> Vec<(String, String)> {
    [
        ("Accept", ""),
        ("Accept-Language", "en-us,en"),
        ("Accept-Charset", "UTF-8,ISO-8859-1;q=0.7,*;q=0.7"),
        ("Keep-Alive", "300"),
        ("Connection", "keep-alive"),
        ("Expect", ""),
        ("Pragma", ""),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

/// Read-only response handed back to the caller after redirects settled.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: ResponseHeaders,
    body: Bytes,
    url: String,
}

impl Response {
    /// Terminal HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// URL actually reached after redirects.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Header lookup by any casing of the canonical name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8 text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fluent builder for [`Connection`].
pub struct ConnectionBuilder {
    transport: Option<Arc<dyn Transport>>,
    extra_headers: Vec<(String, String)>,
    throttle: Option<Throttle>,
    max_redirects: usize,
}

impl ConnectionBuilder {
    pub fn new() -> Self {
        Self {
            transport: None,
            extra_headers: Vec::new(),
            throttle: Some(Throttle::default()),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Adds to (or overrides within) the base header set for every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// Disables the pre-request delay entirely.
    pub fn without_throttle(mut self) -> Self {
        self.throttle = None;
        self
    }

    pub fn with_max_redirects(mut self, hops: usize) -> Self {
        self.max_redirects = hops.max(1);
        self
    }

    pub fn build(self) -> GrabResult<Connection> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        let mut default_headers = base_headers();
        for (name, value) in self.extra_headers {
            upsert_header(&mut default_headers, name, value);
        }

        Ok(Connection {
            transport,
            default_headers,
            jar: CookieJar::new(),
            response_headers: ResponseHeaders::new(),
            parser: HeaderParser::new(),
            throttle: self.throttle,
            max_redirects: self.max_redirects,
            last_status: None,
            last_error: None,
            effective_url: None,
        })
    }
}

impl Default for ConnectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Stateful scraping connection. One request in flight at a time; concurrent
/// scraping means one connection per worker.
pub struct Connection {
    transport: Arc<dyn Transport>,
    default_headers: Vec<(String, String)>,
    jar: CookieJar,
    response_headers: ResponseHeaders,
    parser: HeaderParser,
    throttle: Option<Throttle>,
    max_redirects: usize,
    last_status: Option<u16>,
    last_error: Option<String>,
    effective_url: Option<String>,
}

impl Connection {
    /// Connection with the default reqwest transport and throttle window.
    pub fn new() -> GrabResult<Self> {
        ConnectionBuilder::new().build()
    }

    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    /// GET a URL.
    pub async fn get(&mut self, url: &str, referer: Option<&str>) -> GrabResult<Response> {
        self.request(Method::GET, url, None, referer, &[]).await
    }

    /// POST a body to a URL.
    pub async fn post(
        &mut self,
        url: &str,
        referer: Option<&str>,
        body: RequestBody,
    ) -> GrabResult<Response> {
        self.request(Method::POST, url, Some(body), referer, &[])
            .await
    }

    /// GET or POST with XMLHttpRequest headers. `accept` overrides the
    /// `Accept` header for this call only; the base header set is untouched.
    pub async fn ajax(
        &mut self,
        url: &str,
        referer: Option<&str>,
        body: Option<RequestBody>,
        accept: Option<&str>,
    ) -> GrabResult<Response> {
        let overrides = [
            (
                "Accept".to_string(),
                accept.unwrap_or(AJAX_ACCEPT).to_string(),
            ),
            (
                "X-Requested-With".to_string(),
                "XMLHttpRequest".to_string(),
            ),
        ];
        let method = if body.is_some() {
            Method::POST
        } else {
            Method::GET
        };
        self.request(method, url, body, referer, &overrides).await
    }

    /// Generalized request entry point shared by [`get`](Self::get),
    /// [`post`](Self::post), and [`ajax`](Self::ajax). `extra_headers` are
    /// merged over the base set for this call only.
    pub async fn request(
        &mut self,
        method: Method,
        url: &str,
        body: Option<RequestBody>,
        referer: Option<&str>,
        extra_headers: &[(String, String)],
    ) -> GrabResult<Response> {
        let mut method = method;
        let mut url = url.to_string();
        let mut body = body;
        let mut hops = 0usize;

        loop {
            if let Some(throttle) = &self.throttle {
                sleep(throttle.delay()).await;
            }

            let host = UrlComponents::parse(&url).host;

            let mut headers = self.default_headers.clone();
            for (name, value) in extra_headers {
                upsert_header(&mut headers, name.clone(), value.clone());
            }
            if let Some(referer) = referer {
                upsert_header(&mut headers, "Referer".to_string(), referer.to_string());
            }
            if let Some(cookie) = self.jar.cookie_header(&host) {
                upsert_header(&mut headers, "Cookie".to_string(), cookie);
            }

            log::debug!("-> {method} {url}");
            let request = TransportRequest {
                method: method.clone(),
                url: url.clone(),
                headers,
                body: body.clone(),
            };
            let response = match self.transport.execute(request).await {
                Ok(response) => {
                    self.last_error = None;
                    response
                }
                Err(err) => {
                    self.last_error = Some(err.to_string());
                    return Err(err.into());
                }
            };

            self.response_headers.clear();
            for line in &response.header_lines {
                let (_consumed, event) = self.parser.parse_line(line);
                match event {
                    HeaderEvent::Entry { name, value } => {
                        self.response_headers.insert(name, value);
                    }
                    HeaderEvent::Cookie(cookie) => self.jar.apply(cookie, &host),
                    HeaderEvent::Continuation => {}
                }
            }

            self.last_status = Some(response.status);
            self.effective_url = Some(response.url.clone());
            log::debug!("<- {} {}", response.status, response.url);

            if (300..400).contains(&response.status) {
                if let Some(location) = self.response_headers.get("Location") {
                    hops += 1;
                    if hops > self.max_redirects {
                        log::warn!("redirect ceiling of {} hops hit at {url}", self.max_redirects);
                        return Err(Error::TooManyRedirects(self.max_redirects));
                    }
                    url = redirect_target(&response.url, location);
                    method = Method::GET;
                    body = None;
                    log::debug!("redirect hop {hops} -> {url}");
                    continue;
                }
            }

            return Ok(Response {
                status: response.status,
                headers: self.response_headers.clone(),
                body: response.body,
                url: response.url,
            });
        }
    }

    /// Status code of the last completed transport exchange.
    pub fn last_status(&self) -> Option<u16> {
        self.last_status
    }

    /// Message of the last transport failure, cleared on success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// URL actually reached by the last exchange.
    pub fn effective_url(&self) -> Option<&str> {
        self.effective_url.as_deref()
    }

    /// Response-header lookup by canonical name, last response only.
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers.get(name)
    }

    pub fn response_headers(&self) -> &ResponseHeaders {
        &self.response_headers
    }

    /// Full jar snapshot for external persistence.
    pub fn cookies(&self) -> CookieMap {
        self.jar.export()
    }

    /// Restores a previously exported jar, replacing current contents.
    pub fn load_cookies(&mut self, cookies: CookieMap) {
        self.jar.load(cookies);
    }

    pub fn clear_cookies(&mut self) {
        self.jar.clear();
    }
}

/// Computes the follow-up URL for a redirect: the last path segment of the
/// current effective URL is replaced by the `Location` value (leading slash
/// trimmed). An absolute `Location` is taken as-is. Deliberately simpler than
/// `resolve_absolute`; redirect targets on the scraped sites are plain
/// sibling paths.
fn redirect_target(current: &str, location: &str) -> String {
    if location.contains("://") {
        return location.to_string();
    }
    let base = UrlComponents::parse(current);
    let spliced = location.trim_start_matches('/');
    let mut segments: Vec<&str> = base.path.split('/').collect();
    if let Some(last) = segments.last_mut() {
        *last = spliced;
    }
    format!("{}://{}{}", base.scheme, base.host_port(), segments.join("/"))
}

/// Percent-encodes fields into a request body / query string.
pub fn urlencode_fields<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    encode_query(fields)
}

fn upsert_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    let canonical = canonical_name(&name);
    match headers
        .iter_mut()
        .find(|(existing, _)| canonical_name(existing) == canonical)
    {
        Some((_, existing_value)) => *existing_value = value,
        None => headers.push((name, value)),
    }
}
