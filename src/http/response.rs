use chrono::{DateTime, Utc};

use super::{StatusCode, Version};

/// Value of the `Server` header.
pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub version: Version,
    pub status_code: StatusCode,
    /// Size of the resource, which for HEAD differs from `body.len()`.
    pub content_length: usize,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl Response {
    /// Creates an empty response with the given status code.
    ///
    /// # Arguments
    ///
    /// * `status_code` - The HTTP status code for the response.
    ///
    /// # Returns
    ///
    /// A new `Response` with HTTP version set to HTTP/1.1, no content type
    /// and an empty body.
    pub fn new(status_code: StatusCode) -> Response {
        Response {
            version: Version::HTTP1_1,
            status_code,
            content_length: 0,
            content_type: String::new(),
            body: Vec::new(),
        }
    }

    /// Sets the body and keeps `content_length` in step with it.
    ///
    /// # Arguments
    ///
    /// * `body` - A vector of bytes representing the body of the response.
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.content_length = body.len();
        self.body = body;
    }

    /// Sets the value of the `Content-Type` header.
    ///
    /// # Arguments
    ///
    /// * `content_type` - The MIME type, or an empty string for unknown files.
    pub fn set_content_type(&mut self, content_type: &str) {
        self.content_type = content_type.to_string();
    }

    /// Converts the response to the bytes written to the socket, stamped with
    /// the current time.
    ///
    /// # Returns
    ///
    /// The status line, headers, blank line and body as one buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_bytes_at(Utc::now())
    }

    /// Same as [`Response::to_bytes`] with an explicit `Date`.
    ///
    /// Header order is fixed. Only a 200 carries `Content-Length`,
    /// `Content-Type` and a body; every other status ends at the blank line.
    pub fn to_bytes_at(&self, date: DateTime<Utc>) -> Vec<u8> {
        let mut head = format!(
            "{} {}\r\nServer: {}\r\nDate: {}\r\nConnection: Close\r\n",
            self.version,
            self.status_code,
            SERVER_NAME,
            date.format(HTTP_DATE_FORMAT),
        );

        match self.status_code {
            StatusCode::OK => {
                head.push_str(&format!(
                    "Content-Length: {}\r\nContent-Type: {}\r\n\r\n",
                    self.content_length, self.content_type
                ));
                let mut response = head.into_bytes();
                response.extend_from_slice(&self.body);
                response
            }
            StatusCode::Forbidden | StatusCode::NotFound | StatusCode::MethodNotAllowed => {
                head.push_str("\r\n");
                head.into_bytes()
            }
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Response::new(StatusCode::NotFound)
    }
}
