//! Canned header sets: browser hardening and CORS.

use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use tracing::warn;

/// Set by [`apply_security_headers`](crate::ResponseBuilder::apply_security_headers).
/// Names are lowercase, as `HeaderName::from_static` requires.
pub const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options",        "DENY"),
    ("x-xss-protection",       "1; mode=block"),
    ("referrer-policy",        "strict-origin-when-cross-origin"),
];

pub(crate) fn apply_security(headers: &mut HeaderMap) {
    for (name, value) in SECURITY_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
}

// ── CorsPolicy ────────────────────────────────────────────────────────────────

/// Which CORS headers a response advertises.
///
/// The default is wide open: any origin, credentials allowed. Browsers that
/// follow the Fetch standard reject `*` together with credentials, so anything
/// cookie-based should name its origin:
///
/// ```rust
/// use envelope::CorsPolicy;
/// use http::Method;
///
/// let policy = CorsPolicy::new("https://app.example.com")
///     .allow_methods([Method::GET, Method::PUT])
///     .allow_headers(["Content-Type", "X-Request-Id"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsPolicy {
    origin: String,
    methods: Vec<Method>,
    headers: Vec<String>,
    credentials: bool,
}

impl CorsPolicy {
    /// Policy for `origin` with the default method and header lists and
    /// credentials allowed.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            methods: vec![Method::GET, Method::POST, Method::DELETE, Method::OPTIONS],
            headers: vec!["Content-Type".to_owned(), "Authorization".to_owned()],
            credentials: true,
        }
    }

    pub fn allow_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    pub fn allow_headers<H: Into<String>>(mut self, headers: impl IntoIterator<Item = H>) -> Self {
        self.headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// With `false` the `Access-Control-Allow-Credentials` header is not sent.
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.credentials = allow;
        self
    }

    pub(crate) fn apply(&self, headers: &mut HeaderMap) {
        let methods = self.methods.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
        let allowed = self.headers.join(", ");

        for (name, value) in [
            (ACCESS_CONTROL_ALLOW_ORIGIN,  self.origin.as_str()),
            (ACCESS_CONTROL_ALLOW_METHODS, methods.as_str()),
            (ACCESS_CONTROL_ALLOW_HEADERS, allowed.as_str()),
        ] {
            match HeaderValue::from_str(value) {
                Ok(v)  => { headers.insert(name, v); }
                Err(_) => warn!(header = %name, value, "skipping invalid CORS header value"),
            }
        }

        if self.credentials {
            headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }
    }
}

impl Default for CorsPolicy {
    fn default() -> Self { Self::new("*") }
}
