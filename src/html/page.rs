//! Fetched-document wrapper.
//!
//! Pairs a response body with the URL it was served from so form lookups
//! resolve relative actions against the right base, and supports dumping the
//! raw markup to disk for offline inspection.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::connection::Response;

use super::form::{Form, FormSelector, HtmlError};

/// A document plus the URL it came from.
#[derive(Debug, Clone)]
pub struct Page {
    content: String,
    url: String,
}

impl Page {
    pub fn new(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            url: url.into(),
        }
    }

    /// Wraps a response body, taking the effective URL as the page URL.
    pub fn from_response(response: &Response) -> Self {
        Self::new(response.text(), response.url())
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// First form matching `selector`, with actions resolved against this
    /// page's URL.
    pub fn form(&self, selector: &FormSelector) -> Result<Option<Form>, HtmlError> {
        Form::find(&self.content, &self.url, selector)
    }

    /// Every form in the page, in document order.
    pub fn forms(&self) -> Result<Vec<Form>, HtmlError> {
        Form::find_all(&self.content, &self.url)
    }

    /// Writes the raw markup to `path`, or to a timestamped `.html` file in
    /// the working directory when no path is given. Returns the path written.
    pub fn save(&self, path: Option<&Path>) -> io::Result<PathBuf> {
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(format!("{}.html", Utc::now().timestamp())),
        };
        std::fs::write(&target, &self.content)?;
        Ok(target)
    }
}
