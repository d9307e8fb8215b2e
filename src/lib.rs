//! # webgrab
//!
//! A stateful HTTP scraping client: it keeps cookies and response headers
//! between requests, follows redirects by hand so every intermediate hop is
//! observable, and turns fetched pages into submittable form models.
//!
//! ## Features
//!
//! - Async GET/POST/AJAX requests over reqwest
//! - Domain-aware cookie jar with lazy expiry, exportable for persistence
//! - Incremental response-header parsing with canonical name folding
//! - Manual redirect following with a configurable hop ceiling
//! - Scraping-oriented relative URL resolution
//! - HTML form extraction, editing, file upload, and submission
//! - Randomized pre-request throttling
//!
//! ## Example
//!
//! ```no_run
//! use webgrab::{Connection, FormSelector, Page};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut connection = Connection::new()?;
//!     let response = connection.get("https://example.com/login", None).await?;
//!     let page = Page::from_response(&response);
//!
//!     if let Some(mut form) = page.form(&FormSelector::attr("id", "login"))? {
//!         form.set_field("user", "bob").set_field("pass", "s3cret");
//!         let landed = form.submit(&mut connection, None, &[]).await?;
//!         println!("{} {}", landed.status(), landed.url());
//!     }
//!     Ok(())
//! }
//! ```

mod connection;

pub mod cookies;
pub mod headers;
pub mod html;
pub mod throttle;
pub mod transport;
pub mod url;

pub use crate::connection::{
    AJAX_ACCEPT,
    Connection,
    ConnectionBuilder,
    Error,
    GrabResult,
    Response,
    urlencode_fields,
};

pub use crate::cookies::{CookieJar, CookieMap, CookieRecord};

pub use crate::headers::{
    CookieEvent,
    HeaderEvent,
    HeaderParser,
    ResponseHeaders,
    canonical_name,
};

pub use crate::html::{Form, FormEncoding, FormMethod, FormSelector, HtmlError, Page};

pub use crate::throttle::Throttle;

pub use crate::transport::{
    MultipartField,
    RequestBody,
    Transport,
    TransportError,
    TransportRequest,
    TransportResponse,
    reqwest_client::{ReqwestTransport, ReqwestTransportBuilder},
};

pub use crate::url::{UrlComponents, UrlError, encode_query, parse_query, resolve_absolute};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
