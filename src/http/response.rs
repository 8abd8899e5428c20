use tokio::fs::File;

/// HTTP status codes the server emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use mws::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
        }
    }
}

pub const NOT_FOUND_BODY: &[u8] = b"<html><head><title>404 Not Found</title></head>\
<body><h1>URL not found</h1></body></html>\r\n";

pub const BAD_REQUEST_BODY: &[u8] = b"<html><head><title>400 Bad Request</title></head>\
<body><h1>Bad request</h1></body></html>\r\n";

/// What follows the header block.
#[derive(Debug)]
pub enum Body {
    Empty,
    Static(&'static [u8]),
    /// An open file; `size` is `None` when its metadata could not be read,
    /// in which case it is sent until EOF.
    File { file: File, size: Option<u64> },
}

/// A response ready to be written.
///
/// Headers keep insertion order. No `Content-Length` is ever added: the end
/// of an HTTP/1.0 body is signalled by closing the connection.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use mws::http::response::{Body, ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Server", "mws")
///     .body(Body::Static(b"hi"))
///     .build();
/// assert_eq!(response.headers.len(), 1);
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Body,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    /// Adds a header, replacing any earlier one with the same name.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
        self.headers.push((key, value.into()));
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// 200 with the file as body.
    pub fn file(server: &str, file: File, size: Option<u64>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Server", server)
            .body(Body::File { file, size })
            .build()
    }

    /// 200 without a body, for HEAD.
    pub fn head(server: &str) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Server", server)
            .build()
    }

    pub fn not_found(server: &str) -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .header("Server", server)
            .body(Body::Static(NOT_FOUND_BODY))
            .build()
    }

    pub fn bad_request(server: &str) -> Self {
        ResponseBuilder::new(StatusCode::BadRequest)
            .header("Server", server)
            .body(Body::Static(BAD_REQUEST_BODY))
            .build()
    }
}
