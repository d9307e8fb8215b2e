//! Reqwest-backed implementation of the [`Transport`] trait.
//!
//! Redirects are disabled on the underlying client: the connection follows
//! them itself so every intermediate 30x response stays observable and its
//! cookies land in the jar. Gzip/brotli/deflate bodies are decoded by
//! reqwest.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart;
use reqwest::{Client, Proxy, redirect::Policy};
use std::time::Duration;

use super::{
    MultipartField, RequestBody, Transport, TransportError, TransportRequest, TransportResponse,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Reqwest transport with scraping-friendly defaults.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Wrap an existing reqwest client. The client should already have
    /// redirects disabled, otherwise the connection never sees the
    /// intermediate 30x responses it is supposed to follow itself.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

/// Builder for the transport's client options.
pub struct ReqwestTransportBuilder {
    connect_timeout: Duration,
    timeout: Duration,
    proxy: Option<String>,
    user_agent: Option<String>,
    accept_invalid_certs: bool,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
            proxy: None,
            user_agent: None,
            accept_invalid_certs: false,
        }
    }
}

impl ReqwestTransportBuilder {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn proxy(mut self, endpoint: impl Into<String>) -> Self {
        self.proxy = Some(endpoint.into());
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn build(self) -> Result<ReqwestTransport, TransportError> {
        let mut builder = Client::builder()
            .redirect(Policy::none())
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs);

        if let Some(endpoint) = self.proxy {
            builder = builder.proxy(
                Proxy::all(&endpoint)
                    .map_err(|err| TransportError::Transport(err.to_string()))?,
            );
        }
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder
            .build()
            .map_err(|err| TransportError::Transport(err.to_string()))?;
        Ok(ReqwestTransport { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(convert_headers(&request.headers)?);

        match request.body {
            Some(RequestBody::UrlEncoded(encoded)) => {
                builder = builder
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    )
                    .body(encoded);
            }
            Some(RequestBody::Multipart(fields)) => {
                builder = builder.multipart(build_multipart(fields).await?);
            }
            None => {}
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let header_lines = response
            .headers()
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}: {}",
                    name.as_str(),
                    String::from_utf8_lossy(value.as_bytes())
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::Transport(err.to_string()))?;

        Ok(TransportResponse {
            status,
            header_lines,
            body,
            url,
        })
    }
}

fn convert_headers(headers: &[(String, String)]) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::InvalidHeader(name.clone()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| TransportError::InvalidHeader(name.clone()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

async fn build_multipart(fields: Vec<MultipartField>) -> Result<multipart::Form, TransportError> {
    let mut form = multipart::Form::new();
    for field in fields {
        match field {
            MultipartField::Text { name, value } => {
                form = form.text(name, value);
            }
            MultipartField::File { name, path } => {
                let data = tokio::fs::read(&path)
                    .await
                    .map_err(|err| TransportError::File(format!("{}: {err}", path.display())))?;
                let file_name = path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload".to_string());
                form = form.part(name, multipart::Part::bytes(data).file_name(file_name));
            }
        }
    }
    Ok(form)
}
