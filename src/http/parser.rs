use std::collections::{BTreeSet, HashMap};

use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::form_urlencoded;

use super::{Method, Request, Version};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no blank line terminating the header block")]
    MissingHeaderTerminator,

    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    #[error("malformed header line: {0:?}")]
    MalformedHeader(String),
}

/// Parses a raw HTTP request into a `Request` object.
///
/// `raw` must hold the request line, the header block and the blank line that
/// ends it. Anything after the blank line is kept as the body untouched.
pub fn parse(raw: &[u8]) -> Result<Request, ParseError> {
    let split = raw
        .windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
        .ok_or(ParseError::MissingHeaderTerminator)?;

    // Header bytes may carry invalid UTF-8; the body is passed through as-is
    let head = String::from_utf8_lossy(&raw[..split]);
    let body = raw[split + HEADER_TERMINATOR.len()..].to_vec();

    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();

    let mut request_parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (request_parts.next(), request_parts.next()) else {
        return Err(ParseError::MalformedRequestLine(request_line.to_string()));
    };
    let version = request_parts.next().map(Version::from).unwrap_or(Version::Unknown);

    let mut headers = HashMap::new();
    for line in lines {
        let (name, value) = line
            .split_once(": ")
            .ok_or_else(|| ParseError::MalformedHeader(line.to_string()))?;
        headers.insert(name.to_string(), value.to_string());
    }

    let host = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("Host"))
        .map(|(_, value)| value.clone())
        .unwrap_or_default();

    let (url, path, query) = parse_target(&host, target);

    Ok(Request {
        method: Method::from(method),
        version,
        headers,
        host,
        url,
        path,
        query,
        body,
    })
}

type Target = (String, String, HashMap<String, BTreeSet<String>>);

/// Combines the host with the request target and splits the result into the
/// display URL, the decoded path and the query parameters.
///
/// The path is taken from the target verbatim before decoding, so `.` and
/// `..` segments survive for the handler's root check.
fn parse_target(host: &str, target: &str) -> Target {
    let url = if host.is_empty() || !target.starts_with('/') {
        target.to_string()
    } else {
        format!("http://{host}{target}")
    };

    let (raw_path, raw_query) = split_target(target);
    let path = percent_decode_str(raw_path).decode_utf8_lossy().into_owned();

    let mut query: HashMap<String, BTreeSet<String>> = HashMap::new();
    for (key, value) in form_urlencoded::parse(raw_query.as_bytes()) {
        // Blank values are dropped, as form decoders conventionally do
        if value.is_empty() {
            continue;
        }
        query
            .entry(key.into_owned())
            .or_default()
            .insert(value.into_owned());
    }

    (url, path, query)
}

/// Splits a request target into its still-encoded path and query, dropping
/// any fragment and, for absolute-form targets, the scheme and authority.
fn split_target(target: &str) -> (&str, &str) {
    let target = target.split('#').next().unwrap_or_default();

    let origin = match target.split_once("://") {
        Some((_, rest)) if !target.starts_with('/') => {
            let start = rest.find(['/', '?']).unwrap_or(rest.len());
            &rest[start..]
        }
        _ => target,
    };

    let (path, query) = origin.split_once('?').unwrap_or((origin, ""));
    if path.is_empty() { ("/", query) } else { (path, query) }
}
