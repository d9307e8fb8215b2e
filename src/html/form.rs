//! HTML form extraction and submission.
//!
//! A [`Form`] is an in-memory model of a `<form>` element: absolute action
//! URL, method, body encoding, ordered field values, and which fields carry
//! file uploads. It is built by scanning a tolerantly parsed document, can be
//! edited or populated from caller data, and submits itself back through a
//! [`Connection`].

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::connection::{Connection, GrabResult, Response};
use crate::transport::{MultipartField, RequestBody};
use crate::url::{UrlError, encode_query, parse_query, resolve_absolute};

static FORM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("form").expect("static selector"));
static INPUT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input").expect("static selector"));
static SELECT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("select").expect("static selector"));
static OPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("option").expect("static selector"));
static BUTTON_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("button").expect("static selector"));
static TEXTAREA_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("textarea").expect("static selector"));

#[derive(Debug, Error)]
pub enum HtmlError {
    #[error("invalid reference url: {0}")]
    InvalidRefUrl(#[from] UrlError),
    #[error("file {0} not found or not readable")]
    FileUnreadable(PathBuf),
}

/// Form submission method. Anything the markup declares beyond these falls
/// back to GET during extraction, so an unsupported method is unrepresentable
/// at submit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Get,
    Post,
}

impl FormMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormMethod::Get => "get",
            FormMethod::Post => "post",
        }
    }

    fn from_attr(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "get" => Some(FormMethod::Get),
            "post" => Some(FormMethod::Post),
            _ => None,
        }
    }
}

/// Form body encoding. Multipart always forces POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEncoding {
    UrlEncoded,
    Multipart,
}

impl FormEncoding {
    pub fn content_type(&self) -> &'static str {
        match self {
            FormEncoding::UrlEncoded => "application/x-www-form-urlencoded",
            FormEncoding::Multipart => "multipart/form-data",
        }
    }

    fn from_attr(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "application/x-www-form-urlencoded" => Some(FormEncoding::UrlEncoded),
            "multipart/form-data" => Some(FormEncoding::Multipart),
            _ => None,
        }
    }
}

/// How to pick a form out of a document. Attribute values are compared
/// case-insensitively.
#[derive(Debug, Clone)]
pub enum FormSelector {
    /// Zero-based position among the document's forms.
    Index(usize),
    /// Single attribute name/value pair.
    Attr(String, String),
    /// Every attribute in the map must match.
    Attrs(HashMap<String, String>),
}

impl FormSelector {
    pub fn attr(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormSelector::Attr(name.into(), value.into())
    }

    fn matches(&self, element: &ElementRef, index: usize) -> bool {
        match self {
            FormSelector::Index(wanted) => index == *wanted,
            FormSelector::Attr(name, value) => attr_matches(element, name, value),
            FormSelector::Attrs(attrs) => attrs
                .iter()
                .all(|(name, value)| attr_matches(element, name, value)),
        }
    }
}

fn attr_matches(element: &ElementRef, name: &str, value: &str) -> bool {
    element
        .value()
        .attr(name)
        .is_some_and(|found| found.eq_ignore_ascii_case(value))
}

/// In-memory form model, independently submittable.
#[derive(Debug, Clone)]
pub struct Form {
    ref_url: String,
    action: String,
    method: FormMethod,
    encoding: FormEncoding,
    fields: Vec<(String, String)>,
    file_fields: HashSet<String>,
}

impl Form {
    /// Empty GET/urlencoded form resolved against `ref_url`.
    pub fn new(ref_url: impl Into<String>) -> Self {
        Self {
            ref_url: ref_url.into(),
            action: String::new(),
            method: FormMethod::Get,
            encoding: FormEncoding::UrlEncoded,
            fields: Vec::new(),
            file_fields: HashSet::new(),
        }
    }

    /// Finds the first form matching `selector`. Malformed markup parses
    /// tolerantly; an absent form is `None`, never an error.
    pub fn find(
        html: &str,
        ref_url: &str,
        selector: &FormSelector,
    ) -> Result<Option<Form>, HtmlError> {
        let document = Html::parse_document(html);
        for (index, element) in document.select(&FORM_SELECTOR).enumerate() {
            if selector.matches(&element, index) {
                return Ok(Some(Form::from_element(&element, ref_url)?));
            }
        }
        Ok(None)
    }

    /// Collects every form in the document; an empty vec means none found.
    pub fn find_all(html: &str, ref_url: &str) -> Result<Vec<Form>, HtmlError> {
        let document = Html::parse_document(html);
        document
            .select(&FORM_SELECTOR)
            .map(|element| Form::from_element(&element, ref_url))
            .collect()
    }

    /// Like [`find`](Self::find), resolving against the connection's last
    /// effective URL.
    pub fn find_in(
        html: &str,
        connection: &Connection,
        selector: &FormSelector,
    ) -> Result<Option<Form>, HtmlError> {
        Form::find(html, connection.effective_url().unwrap_or(""), selector)
    }

    fn from_element(element: &ElementRef, ref_url: &str) -> Result<Form, HtmlError> {
        let mut form = Form::new(ref_url);

        form.set_action(element.value().attr("action").unwrap_or(""))?;
        if let Some(method) = element
            .value()
            .attr("method")
            .and_then(FormMethod::from_attr)
        {
            form.method = method;
        }
        if let Some(encoding) = element
            .value()
            .attr("enctype")
            .and_then(FormEncoding::from_attr)
        {
            form.set_encoding(encoding);
        }

        // Fixed scan order; a later category's value for the same name
        // overwrites an earlier one.
        form.collect_inputs(element);
        form.collect_selects(element);
        form.collect_buttons(element);
        form.collect_textareas(element);

        Ok(form)
    }

    fn collect_inputs(&mut self, element: &ElementRef) {
        for input in usable_elements(element, &INPUT_SELECTOR) {
            let value = input.value();
            let name = value.attr("name").unwrap_or_default().to_string();
            let input_type = value
                .attr("type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_else(|| "text".to_string());

            match input_type.as_str() {
                "checkbox" | "radio" => {
                    if value.attr("checked").is_some() {
                        let declared = value.attr("value").unwrap_or("on").to_string();
                        self.set_field(&name, declared);
                    }
                }
                "button" | "reset" => {}
                other => {
                    let declared = value.attr("value").unwrap_or("").to_string();
                    self.set_field(&name, declared);
                    if other == "file" {
                        self.file_fields.insert(name);
                    }
                }
            }
        }
    }

    fn collect_selects(&mut self, element: &ElementRef) {
        for select in usable_elements(element, &SELECT_SELECTOR) {
            let name = select.value().attr("name").unwrap_or_default().to_string();
            let multiple = select.value().attr("multiple").is_some();

            let mut selected = Vec::new();
            let mut first_value: Option<String> = None;

            for (index, option) in select.select(&OPTION_SELECTOR).enumerate() {
                let value = option
                    .value()
                    .attr("value")
                    .map(str::to_string)
                    .unwrap_or_else(|| option.text().collect());
                let is_selected = option.value().attr("selected").is_some();

                if index == 0 {
                    first_value = Some(value.clone());
                }
                if is_selected {
                    selected.push(value);
                    if !multiple {
                        break;
                    }
                }
            }

            if selected.is_empty() {
                // First option's value is the one-shot default.
                if let Some(first) = first_value {
                    selected.push(first);
                }
            } else if !multiple {
                selected.truncate(1);
            }

            if !selected.is_empty() {
                self.set_values(&name, selected);
            }
        }
    }

    fn collect_buttons(&mut self, element: &ElementRef) {
        for button in usable_elements(element, &BUTTON_SELECTOR) {
            let value = button.value();
            let type_ok = value
                .attr("type")
                .is_none_or(|t| t.eq_ignore_ascii_case("submit"));
            if let Some(declared) = value.attr("value") {
                if type_ok {
                    let name = value.attr("name").unwrap_or_default().to_string();
                    self.set_field(&name, declared.to_string());
                }
            }
        }
    }

    fn collect_textareas(&mut self, element: &ElementRef) {
        for textarea in usable_elements(element, &TEXTAREA_SELECTOR) {
            let name = textarea.value().attr("name").unwrap_or_default().to_string();
            let content: String = textarea.text().collect();
            self.set_field(&name, content);
        }
    }

    /// Sets the action, resolving it absolute against the reference URL.
    /// Whitespace inside the attribute is stripped before resolution.
    pub fn set_action(&mut self, action: &str) -> Result<&mut Self, HtmlError> {
        self.action = if self.ref_url.is_empty() {
            crate::url::strip_whitespace(action)
        } else {
            resolve_absolute(action, &self.ref_url)?
        };
        Ok(self)
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn set_method(&mut self, method: FormMethod) -> &mut Self {
        self.method = method;
        self
    }

    pub fn method(&self) -> FormMethod {
        self.method
    }

    /// Sets the encoding; multipart forces POST.
    pub fn set_encoding(&mut self, encoding: FormEncoding) -> &mut Self {
        self.encoding = encoding;
        if encoding == FormEncoding::Multipart {
            self.method = FormMethod::Post;
        }
        self
    }

    pub fn encoding(&self) -> FormEncoding {
        self.encoding
    }

    pub fn ref_url(&self) -> &str {
        &self.ref_url
    }

    pub fn set_ref_url(&mut self, ref_url: impl Into<String>) -> &mut Self {
        self.ref_url = ref_url.into();
        self
    }

    /// Replaces every value held under `name` with a single value. A known
    /// name keeps its position; a new name goes to the end.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.set_values(name, vec![value.into()])
    }

    /// Replaces every value held under `name`. Multi-valued names (multi
    /// selects) serialize as repeated keys.
    pub fn set_values(&mut self, name: &str, values: Vec<String>) -> &mut Self {
        let at = self
            .fields
            .iter()
            .position(|(existing, _)| existing == name);
        self.fields.retain(|(existing, _)| existing != name);
        let at = at.unwrap_or(self.fields.len());
        for (offset, value) in values.into_iter().enumerate() {
            self.fields.insert(at + offset, (name.to_string(), value));
        }
        self
    }

    /// First value held under `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn remove_field(&mut self, name: &str) -> &mut Self {
        self.fields.retain(|(existing, _)| existing != name);
        self.file_fields.remove(name);
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.fields.clear();
        self.file_fields.clear();
        self
    }

    pub fn is_file_field(&self, name: &str) -> bool {
        self.file_fields.contains(name)
    }

    /// Attaches a file for upload. The target must exist and be readable;
    /// on failure the model is left untouched. Success forces POST +
    /// multipart.
    pub fn add_file(
        &mut self,
        field: &str,
        path: impl AsRef<Path>,
    ) -> Result<&mut Self, HtmlError> {
        let path = path.as_ref();
        let canonical = path
            .canonicalize()
            .map_err(|_| HtmlError::FileUnreadable(path.to_path_buf()))?;
        if !canonical.is_file() || std::fs::File::open(&canonical).is_err() {
            return Err(HtmlError::FileUnreadable(canonical));
        }

        self.set_field(field, canonical.to_string_lossy().into_owned());
        self.file_fields.insert(field.to_string());
        self.method = FormMethod::Post;
        self.encoding = FormEncoding::Multipart;
        Ok(self)
    }

    /// Merges caller-supplied values into the fields. Under multipart
    /// encoding a value starting with `@` names a file to attach; the rest
    /// of the value is the path.
    pub fn from_pairs<I>(&mut self, pairs: I) -> Result<&mut Self, HtmlError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in pairs {
            if self.encoding == FormEncoding::Multipart && value.starts_with('@') {
                self.add_file(&name, &value[1..])?;
            } else {
                self.set_field(&name, value);
            }
        }
        Ok(self)
    }

    /// Merges fields parsed from an HTTP query string.
    pub fn from_query_string(&mut self, query: &str) -> Result<&mut Self, HtmlError> {
        self.from_pairs(parse_query(query))
    }

    /// Urlencoded serialization of the fields.
    pub fn to_query_string(&self) -> String {
        encode_query(self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    fn multipart_fields(&self) -> Vec<MultipartField> {
        self.fields
            .iter()
            .map(|(name, value)| {
                if self.file_fields.contains(name) {
                    MultipartField::File {
                        name: name.clone(),
                        path: PathBuf::from(value),
                    }
                } else {
                    MultipartField::Text {
                        name: name.clone(),
                        value: value.clone(),
                    }
                }
            })
            .collect()
    }

    /// Submits the form through `connection`. The referer defaults to the
    /// form's reference URL. Dispatch is exhaustive over the method enum.
    pub async fn submit(
        &self,
        connection: &mut Connection,
        referer: Option<&str>,
        extra_headers: &[(String, String)],
    ) -> GrabResult<Response> {
        let fallback = (!self.ref_url.is_empty()).then_some(self.ref_url.as_str());
        let referer = referer.or(fallback);

        match self.method {
            FormMethod::Get => {
                let mut url = self.action.clone();
                let query = self.to_query_string();
                if !query.is_empty() {
                    url.push(if url.contains('?') { '&' } else { '?' });
                    url.push_str(&query);
                }
                connection
                    .request(http::Method::GET, &url, None, referer, extra_headers)
                    .await
            }
            FormMethod::Post => {
                let body = match self.encoding {
                    FormEncoding::Multipart => RequestBody::Multipart(self.multipart_fields()),
                    FormEncoding::UrlEncoded => RequestBody::UrlEncoded(self.to_query_string()),
                };
                connection
                    .request(
                        http::Method::POST,
                        &self.action,
                        Some(body),
                        referer,
                        extra_headers,
                    )
                    .await
            }
        }
    }
}

/// Elements of the given kind under `root` that carry a non-empty `name`
/// and are not disabled.
fn usable_elements<'a>(root: &ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    root.select(selector)
        .filter(|element| {
            element
                .value()
                .attr("name")
                .is_some_and(|name| !name.is_empty())
                && element.value().attr("disabled").is_none()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REF: &str = "http://a.b/x/y";

    fn first_form(html: &str) -> Form {
        Form::find(html, REF, &FormSelector::Index(0))
            .unwrap()
            .expect("form present")
    }

    #[test]
    fn extracts_action_method_and_text_input() {
        let form = first_form(
            r#"<form action="/s" method="post">
                 <input name="q" value="x">
                 <input type="checkbox" name="c" value="1">
               </form>"#,
        );
        assert_eq!(form.action(), "http://a.b/s");
        assert_eq!(form.method(), FormMethod::Post);
        assert_eq!(form.fields(), &[("q".to_string(), "x".to_string())]);
    }

    #[test]
    fn relative_action_replaces_last_segment() {
        let form = first_form(r#"<form action="search.php"><input name="q" value=""></form>"#);
        assert_eq!(form.action(), "http://a.b/x/search.php");
    }

    #[test]
    fn action_whitespace_is_stripped() {
        let form = first_form("<form action=\"sea\n\trch.php\"></form>");
        assert_eq!(form.action(), "http://a.b/x/search.php");
    }

    #[test]
    fn unknown_method_falls_back_to_get() {
        let form = first_form(r#"<form action="/s" method="PATCH"></form>"#);
        assert_eq!(form.method(), FormMethod::Get);
    }

    #[test]
    fn multipart_enctype_forces_post() {
        let form = first_form(
            r#"<form action="/u" method="get" enctype="multipart/form-data"></form>"#,
        );
        assert_eq!(form.encoding(), FormEncoding::Multipart);
        assert_eq!(form.method(), FormMethod::Post);
    }

    #[test]
    fn checked_radio_yields_single_value() {
        let form = first_form(
            r#"<form action="/s">
                 <input type="radio" name="pick" value="a">
                 <input type="radio" name="pick" value="b" checked>
                 <input type="radio" name="pick" value="c">
               </form>"#,
        );
        assert_eq!(form.fields(), &[("pick".to_string(), "b".to_string())]);
    }

    #[test]
    fn checked_checkbox_without_value_defaults_on() {
        let form = first_form(
            r#"<form action="/s"><input type="checkbox" name="agree" checked></form>"#,
        );
        assert_eq!(form.field("agree"), Some("on"));
    }

    #[test]
    fn disabled_and_unnamed_inputs_are_skipped() {
        let form = first_form(
            r#"<form action="/s">
                 <input name="ok" value="1">
                 <input name="off" value="2" disabled>
                 <input value="3">
                 <input type="button" name="b" value="4">
                 <input type="reset" name="r" value="5">
               </form>"#,
        );
        assert_eq!(form.fields(), &[("ok".to_string(), "1".to_string())]);
    }

    #[test]
    fn file_input_is_tracked_separately() {
        let form = first_form(
            r#"<form action="/u"><input type="file" name="upload" value=""></form>"#,
        );
        assert!(form.is_file_field("upload"));
        assert_eq!(form.field("upload"), Some(""));
    }

    #[test]
    fn single_select_defaults_to_first_option() {
        let form = first_form(
            r#"<form action="/s"><select name="lang">
                 <option value="en">English</option>
                 <option value="de">German</option>
               </select></form>"#,
        );
        assert_eq!(form.field("lang"), Some("en"));
    }

    #[test]
    fn single_select_first_selected_wins() {
        let form = first_form(
            r#"<form action="/s"><select name="lang">
                 <option value="en">English</option>
                 <option value="de" selected>German</option>
                 <option value="fr" selected>French</option>
               </select></form>"#,
        );
        assert_eq!(form.fields(), &[("lang".to_string(), "de".to_string())]);
    }

    #[test]
    fn option_without_value_uses_text_content() {
        let form = first_form(
            r#"<form action="/s"><select name="lang"><option>English</option></select></form>"#,
        );
        assert_eq!(form.field("lang"), Some("English"));
    }

    #[test]
    fn multi_select_collects_every_selected_option() {
        let form = first_form(
            r#"<form action="/s"><select name="tag" multiple>
                 <option value="a">A</option>
                 <option value="b" selected>B</option>
                 <option value="c" selected>C</option>
               </select></form>"#,
        );
        assert_eq!(
            form.fields(),
            &[
                ("tag".to_string(), "b".to_string()),
                ("tag".to_string(), "c".to_string())
            ]
        );
    }

    #[test]
    fn multi_select_without_selection_defaults_to_first() {
        let form = first_form(
            r#"<form action="/s"><select name="tag" multiple>
                 <option value="a">A</option>
                 <option value="b">B</option>
               </select></form>"#,
        );
        assert_eq!(form.fields(), &[("tag".to_string(), "a".to_string())]);
    }

    #[test]
    fn buttons_require_value_and_submit_type() {
        let form = first_form(
            r#"<form action="/s">
                 <button name="go" value="1">Go</button>
                 <button name="explicit" type="submit" value="2">Go</button>
                 <button name="plain" type="button" value="3">Nope</button>
                 <button name="novalue">Nope</button>
               </form>"#,
        );
        assert_eq!(
            form.fields(),
            &[
                ("go".to_string(), "1".to_string()),
                ("explicit".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn textarea_content_is_verbatim() {
        let form = first_form(
            "<form action=\"/s\"><textarea name=\"msg\">line one\nline two</textarea></form>",
        );
        assert_eq!(form.field("msg"), Some("line one\nline two"));
    }

    #[test]
    fn later_category_overwrites_earlier_name() {
        let form = first_form(
            r#"<form action="/s">
                 <input name="v" value="from-input">
                 <textarea name="v">from-textarea</textarea>
               </form>"#,
        );
        assert_eq!(form.fields(), &[("v".to_string(), "from-textarea".to_string())]);
    }

    #[test]
    fn selector_by_attribute_is_case_insensitive_on_value() {
        let html = r#"<form action="/a" id="first"></form><form action="/b" id="Login"></form>"#;
        let form = Form::find(html, REF, &FormSelector::attr("id", "login"))
            .unwrap()
            .expect("form present");
        assert_eq!(form.action(), "http://a.b/b");
    }

    #[test]
    fn selector_attr_map_requires_all_matches() {
        let html =
            r#"<form action="/a" id="f" class="x"></form><form action="/b" id="f" class="y"></form>"#;
        let mut attrs = HashMap::new();
        attrs.insert("id".to_string(), "f".to_string());
        attrs.insert("class".to_string(), "y".to_string());
        let form = Form::find(html, REF, &FormSelector::Attrs(attrs))
            .unwrap()
            .expect("form present");
        assert_eq!(form.action(), "http://a.b/b");
    }

    #[test]
    fn missing_form_is_not_found() {
        assert!(Form::find("<p>no forms here</p>", REF, &FormSelector::Index(0))
            .unwrap()
            .is_none());
        assert!(Form::find_all("<p>no forms here</p>", REF).unwrap().is_empty());
    }

    #[test]
    fn find_all_returns_document_order() {
        let forms = Form::find_all(
            r#"<form action="/one"></form><form action="/two"></form>"#,
            REF,
        )
        .unwrap();
        let actions: Vec<&str> = forms.iter().map(Form::action).collect();
        assert_eq!(actions, vec!["http://a.b/one", "http://a.b/two"]);
    }

    #[test]
    fn invalid_ref_url_is_rejected() {
        let result = Form::find(r#"<form action="/s"></form>"#, "not-a-host", &FormSelector::Index(0));
        assert!(matches!(result, Err(HtmlError::InvalidRefUrl(_))));
    }

    #[test]
    fn add_file_missing_target_leaves_model_unchanged() {
        let mut form = Form::new(REF);
        form.set_field("q", "x");
        let err = form.add_file("upload", "/no/such/file").unwrap_err();
        assert!(matches!(err, HtmlError::FileUnreadable(_)));
        assert_eq!(form.method(), FormMethod::Get);
        assert_eq!(form.encoding(), FormEncoding::UrlEncoded);
        assert!(!form.is_file_field("upload"));
    }

    #[test]
    fn add_file_forces_post_multipart() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut form = Form::new(REF);
        form.add_file("upload", file.path()).unwrap();
        assert_eq!(form.method(), FormMethod::Post);
        assert_eq!(form.encoding(), FormEncoding::Multipart);
        assert!(form.is_file_field("upload"));
        assert!(form.field("upload").is_some());
    }

    #[test]
    fn from_query_string_merges_fields() {
        let mut form = Form::new(REF);
        form.set_field("keep", "1");
        form.from_query_string("q=a+b&keep=2").unwrap();
        assert_eq!(form.field("q"), Some("a b"));
        assert_eq!(form.field("keep"), Some("2"));
    }

    #[test]
    fn from_pairs_routes_at_values_through_add_file_under_multipart() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut form = Form::new(REF);
        form.set_encoding(FormEncoding::Multipart);
        form.from_pairs([(
            "upload".to_string(),
            format!("@{}", file.path().display()),
        )])
        .unwrap();
        assert!(form.is_file_field("upload"));

        // Outside multipart the value is stored as-is.
        let mut plain = Form::new(REF);
        plain
            .from_pairs([("note".to_string(), "@literal".to_string())])
            .unwrap();
        assert_eq!(plain.field("note"), Some("@literal"));
        assert!(!plain.is_file_field("note"));
    }

    #[test]
    fn to_query_string_encodes_repeated_keys() {
        let mut form = Form::new(REF);
        form.set_values("tag", vec!["a".to_string(), "b c".to_string()]);
        assert_eq!(form.to_query_string(), "tag=a&tag=b+c");
    }
}
