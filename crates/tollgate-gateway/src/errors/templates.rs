//! Error-template selection and rendering.
//!
//! Templates are a fixed, preloaded set keyed by exact name:
//! `error_<code>.<ext>` for status-specific bodies, `error.<ext>` as the
//! per-format generic, `error.json` as the final fallback (which also
//! forces the response content type to JSON). The error message is
//! escaped before substitution so reflected text cannot inject into
//! either format.

use std::collections::HashMap;

pub const DEFAULT_TEMPLATE_NAME: &str = "error";

const DEFAULT_JSON_TEMPLATE: &str = r#"{
    "error": "{{message}}"
}"#;

const DEFAULT_XML_TEMPLATE: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<error>{{message}}</error>";

/// Negotiated error-body format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    Json,
    Xml,
}

impl TemplateFormat {
    pub fn ext(&self) -> &'static str {
        match self {
            TemplateFormat::Json => "json",
            TemplateFormat::Xml => "xml",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            TemplateFormat::Json => "application/json",
            TemplateFormat::Xml => "application/xml",
        }
    }

    /// Format declared by a request's `Content-Type`; anything but XML
    /// negotiates JSON.
    pub fn from_content_type(value: Option<&str>) -> Self {
        let essence = value
            .and_then(|v| v.split(';').next())
            .map(str::trim)
            .unwrap_or_default();
        if essence == "application/xml" {
            TemplateFormat::Xml
        } else {
            TemplateFormat::Json
        }
    }
}

/// Preloaded template set.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<String, String>,
}

impl TemplateRegistry {
    /// Registry holding the built-in `error.json` and `error.xml`.
    pub fn with_defaults() -> Self {
        let mut templates = HashMap::new();
        templates.insert("error.json".to_string(), DEFAULT_JSON_TEMPLATE.to_string());
        templates.insert("error.xml".to_string(), DEFAULT_XML_TEMPLATE.to_string());
        Self { templates }
    }

    /// Register a template under an exact name, e.g. `error_404.xml`.
    pub fn insert(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(name.into(), template.into());
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    /// Resolve the template for a status code and negotiated format.
    ///
    /// Returns the template together with the format actually served,
    /// which differs from the requested one only on the final
    /// `error.json` fallback.
    pub fn resolve(&self, status: u16, format: TemplateFormat) -> (&str, TemplateFormat) {
        let specific = format!("error_{status}.{}", format.ext());
        if let Some(template) = self.lookup(&specific) {
            return (template, format);
        }

        let generic = format!("{DEFAULT_TEMPLATE_NAME}.{}", format.ext());
        if let Some(template) = self.lookup(&generic) {
            return (template, format);
        }

        match self.lookup("error.json") {
            Some(template) => (template, TemplateFormat::Json),
            None => (DEFAULT_JSON_TEMPLATE, TemplateFormat::Json),
        }
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Substitute the escaped message into a template.
pub fn render(template: &str, message: &str) -> String {
    template.replace("{{message}}", &escape_message(message))
}

/// Escape a message for embedding in a JSON string or XML text node.
pub fn escape_message(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '&' => out.push_str("\\u0026"),
            '\'' => out.push_str("\\u0027"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}
