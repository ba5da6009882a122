//! Request description passed to [`HttpClient::send`](super::HttpClient::send)

use reqwest::Method;

/// Body attached to a request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestBody {
    /// Serialized JSON sent as `application/json`
    Json(String),
    /// Fields sent as `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
}

/// A request to send through the retrying client
///
/// The request is rebuilt from this description on every attempt, so it is kept
/// as plain data rather than a `reqwest::RequestBuilder`.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Target URL
    pub url: String,
    /// Optional body
    pub body: Option<RequestBody>,
    /// Extra headers for this request only
    pub headers: Vec<(String, String)>,
    /// Attempt bound for this request (None = client default)
    pub max_attempts: Option<u32>,
}

impl HttpRequest {
    /// Create a request with the given method and URL
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: Vec::new(),
            max_attempts: None,
        }
    }

    /// GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// POST request with a JSON body
    pub fn post_json(url: impl Into<String>, json: impl Into<String>) -> Self {
        Self::new(Method::POST, url).body(RequestBody::Json(json.into()))
    }

    /// POST request with form-encoded fields
    pub fn post_form<I, K, V>(url: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(Method::POST, url).body(RequestBody::Form(fields))
    }

    /// Attach a body
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add several headers
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Override the client's attempt bound
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}
