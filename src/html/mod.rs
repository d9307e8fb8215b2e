//! HTML-side surface: form models and fetched pages.

pub mod form;
pub mod page;

pub use form::{Form, FormEncoding, FormMethod, FormSelector, HtmlError};
pub use page::Page;
