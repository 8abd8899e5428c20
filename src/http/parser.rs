use crate::http::request::{Method, Request};

/// Marks a line as an HTTP request line. Everything from here on (the
/// version token) is ignored; all requests are treated as HTTP/1.0.
const HTTP_MARKER: &[u8] = b" HTTP/";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("not an HTTP request line")]
    NotHttp,
    #[error("{0} request without a target")]
    MissingTarget(&'static str),
    #[error("request target is not valid UTF-8")]
    InvalidEncoding,
}

/// Classifies a request line (terminator already stripped).
///
/// The method is matched as an exact, case-sensitive prefix (`"GET "` or
/// `"HEAD "`); the target is whatever sits between it and `" HTTP/"`. Lines
/// with any other method parse as [`Method::UNKNOWN`] rather than failing.
pub fn parse_request_line(line: &[u8]) -> Result<Request, ParseError> {
    let marker = find_marker(line).ok_or(ParseError::NotHttp)?;
    let prefix = &line[..marker];

    let Some(space) = prefix.iter().position(|&b| b == b' ') else {
        return Ok(Request::unknown());
    };
    let method = std::str::from_utf8(&prefix[..space])
        .ok()
        .and_then(Method::from_str);
    let Some(method) = method else {
        return Ok(Request::unknown());
    };

    let target = &prefix[space + 1..];
    if target.is_empty() {
        return Err(ParseError::MissingTarget(method.as_str()));
    }
    let target = std::str::from_utf8(target).map_err(|_| ParseError::InvalidEncoding)?;

    Ok(Request {
        method,
        target: target.to_string(),
    })
}

fn find_marker(line: &[u8]) -> Option<usize> {
    line.windows(HTTP_MARKER.len())
        .position(|w| w == HTTP_MARKER)
}
