use crate::error::Result;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What a driver sends with a POST.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Encoded as `application/x-www-form-urlencoded`, in key order.
    Form(BTreeMap<String, String>),
    /// Sent verbatim; the caller owns its encoding.
    Raw(String),
}

impl From<BTreeMap<String, String>> for Body {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Body::Form(fields)
    }
}

impl From<String> for Body {
    fn from(raw: String) -> Self {
        Body::Raw(raw)
    }
}

impl From<&str> for Body {
    fn from(raw: &str) -> Self {
        Body::Raw(raw.to_owned())
    }
}

/// A single call to a gateway endpoint: a GET without a body, a POST with one.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    url: String,
    body: Option<Body>,
    credentials: Option<(String, Option<String>)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: None,
            credentials: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<Body>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::get(url)
        }
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.credentials = Some((username.into(), password));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_post(&self) -> bool {
        self.body.is_some()
    }

    fn build(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let builder = match &self.body {
            None => client.get(&self.url),
            Some(Body::Form(fields)) => client.post(&self.url).form(fields),
            Some(Body::Raw(raw)) => client.post(&self.url).body(raw.clone()),
        };

        match &self.credentials {
            Some((username, password)) => builder.basic_auth(username, password.as_ref()),
            None => builder,
        }
    }
}

/// Shared HTTP client for drivers that talk to their gateway directly.
///
/// The response body is returned whatever the status code; deciding what a
/// non-2xx answer means is the driver's job. Transport failures are errors.
#[derive(Clone)]
pub struct HttpHelper {
    client: reqwest::Client,
}

impl HttpHelper {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn send(&self, request: &HttpRequest) -> Result<String> {
        let response = request.build(&self.client).send().await?;
        debug!(
            url = request.url(),
            post = request.is_post(),
            status = response.status().as_u16(),
            "Gateway answered"
        );
        Ok(response.text().await?)
    }
}
