//! Browser hand-off to payment pages that must receive a POST from the payer.
//!
//! Some gateways set payer-specific session state on their payment page, so
//! the server cannot post on the payer's behalf. Instead the payer's browser
//! is handed a self-submitting form.

use html_escape::{encode_double_quoted_attribute, encode_text};
use std::collections::BTreeMap;
use std::io::{self, Write};

pub const DEFAULT_REDIRECT_MESSAGE: &str =
    "Please wait while we redirect you to the payment page...";

/// What to post to the payment page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectData {
    /// Rendered as one hidden input per pair, in order. Keys are written as-is.
    Fields(Vec<(String, String)>),
    /// A pre-built form body, embedded verbatim.
    Raw(String),
}

impl From<BTreeMap<String, String>> for RedirectData {
    fn from(fields: BTreeMap<String, String>) -> Self {
        RedirectData::Fields(fields.into_iter().collect())
    }
}

impl From<Vec<(String, String)>> for RedirectData {
    fn from(fields: Vec<(String, String)>) -> Self {
        RedirectData::Fields(fields)
    }
}

/// A terminal response that sends the payer's browser to `target_url` via POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPost {
    target_url: String,
    data: RedirectData,
    message: String,
}

impl RedirectPost {
    pub fn new(target_url: impl Into<String>, data: impl Into<RedirectData>) -> Self {
        Self {
            target_url: target_url.into(),
            data: data.into(),
            message: DEFAULT_REDIRECT_MESSAGE.to_owned(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn data(&self) -> &RedirectData {
        &self.data
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Renders the auto-submitting page.
    pub fn render(&self) -> String {
        let mut body = String::new();
        match &self.data {
            RedirectData::Fields(fields) => {
                for (key, value) in fields {
                    body.push_str(&format!(
                        "\t\t\t<input type=\"hidden\" name=\"{}\" value=\"{}\" />\n",
                        key,
                        encode_double_quoted_attribute(value)
                    ));
                }
            }
            RedirectData::Raw(raw) => {
                body.push_str("\t\t\t");
                body.push_str(raw);
                body.push('\n');
            }
        }

        format!(
            concat!(
                "<!DOCTYPE html>\n",
                "<html>\n",
                "<head><title>Redirecting...</title></head>\n",
                "<body onload=\"document.forms[0].submit();\">\n",
                "\t<p>{message}</p>\n",
                "\t<form name=\"payment\" action=\"{action}\" method=\"post\">\n",
                "\t\t<p>\n",
                "{body}",
                "\t\t\t<input type=\"submit\" value=\"Continue\" />\n",
                "\t\t</p>\n",
                "\t</form>\n",
                "</body>\n",
                "</html>\n",
            ),
            message = encode_text(&self.message),
            action = encode_double_quoted_attribute(&self.target_url),
            body = body,
        )
    }

    /// Writes the page and consumes the redirect; the interaction ends here.
    pub fn write_to<W: Write>(self, mut out: W) -> io::Result<()> {
        out.write_all(self.render().as_bytes())?;
        out.flush()
    }
}
