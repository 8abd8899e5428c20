/// HTTP request methods.
///
/// Only GET and HEAD are served. Any other method on an otherwise valid
/// request line is parsed as `UNKNOWN` and answered as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// Anything else
    UNKNOWN,
}

impl Method {
    /// Parses a method token (case-sensitive).
    ///
    /// # Example
    ///
    /// ```
    /// # use mws::http::request::Method;
    /// assert_eq!(Method::from_str("HEAD"), Some(Method::HEAD));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "HEAD" => Some(Method::HEAD),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::UNKNOWN => "UNKNOWN",
        }
    }
}

/// A parsed request line.
///
/// `target` is non-empty unless `method` is `UNKNOWN`, in which case it is
/// always empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// The request target exactly as sent (e.g. "/docs/")
    pub target: String,
}

impl Request {
    pub fn unknown() -> Self {
        Self {
            method: Method::UNKNOWN,
            target: String::new(),
        }
    }

    /// Whether the server can answer this request with a resource.
    pub fn is_supported(&self) -> bool {
        self.method != Method::UNKNOWN
    }

    /// HEAD responses never carry a body.
    pub fn wants_body(&self) -> bool {
        self.method == Method::GET
    }
}
