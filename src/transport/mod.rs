//! Transport seam between the connection and the HTTP engine.
//!
//! The connection never talks to reqwest directly; it hands a
//! [`TransportRequest`] to a [`Transport`] implementation and gets back the
//! status, the raw header lines (replayed one at a time into the header
//! parser), the decoded body, and the effective URL. Tests substitute a
//! scripted transport through the same trait.

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use std::path::PathBuf;
use thiserror::Error;

pub mod reqwest_client;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("file part unreadable: {0}")]
    File(String),
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartField {
    Text { name: String, value: String },
    File { name: String, path: PathBuf },
}

/// Request body encodings supported for form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    UrlEncoded(String),
    Multipart(Vec<MultipartField>),
}

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    /// Raw `name: value` header lines in arrival order.
    pub header_lines: Vec<String>,
    pub body: Bytes,
    /// URL the transport actually reached.
    pub url: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: TransportRequest)
        -> Result<TransportResponse, TransportError>;
}
