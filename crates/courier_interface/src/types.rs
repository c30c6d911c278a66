//! Wire-neutral request/response shapes for the HTTP transport seam.

/// One outbound HTTP call, ready for a transport to execute.
///
/// Authentication is the transport's concern; the call carries only the
/// target URL and the JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpCall {
    /// Absolute request URL
    pub url: String,
    /// JSON request body
    pub body: serde_json::Value,
}

/// The raw upstream answer to an [`HttpCall`].
///
/// The transport reports every response that carries a status code here,
/// success or not; classifying the status is the caller's job. Failures
/// without a status (DNS, TLS, resets) surface as transport errors instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code
    pub status: u16,
    /// Response body, verbatim
    pub body: String,
}

impl HttpReply {
    /// Whether the status code is in the 2xx success range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
