//! Request and response messages handed to contract validation.
//!
//! These are plain data: whatever HTTP stack executed the exchange copies
//! method, URI, headers and body in, and validation only ever reads them.

mod request;
mod response;

pub use request::ContractRequest;
pub use response::ContractResponse;

use std::collections::HashMap;
use std::fmt;

/// Which side of an exchange a message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Request,
    Response,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Request => write!(f, "request"),
            MessageKind::Response => write!(f, "response"),
        }
    }
}

/// A request or a response, borrowed for one `validate` call.
#[derive(Debug, Clone, Copy)]
pub enum Message<'a> {
    Request(&'a ContractRequest),
    Response(&'a ContractResponse),
}

impl Message<'_> {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Request(_) => MessageKind::Request,
            Message::Response(_) => MessageKind::Response,
        }
    }

    pub fn body(&self) -> &[u8] {
        match self {
            Message::Request(r) => &r.body,
            Message::Response(r) => &r.body,
        }
    }

    pub fn content_type(&self) -> Option<String> {
        match self {
            Message::Request(r) => r.content_type(),
            Message::Response(r) => r.content_type(),
        }
    }
}

impl<'a> From<&'a ContractRequest> for Message<'a> {
    fn from(request: &'a ContractRequest) -> Self {
        Message::Request(request)
    }
}

impl<'a> From<&'a ContractResponse> for Message<'a> {
    fn from(response: &'a ContractResponse) -> Self {
        Message::Response(response)
    }
}

fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .get(&name.to_ascii_lowercase())
        .or_else(|| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
        .map(String::as_str)
}

fn media_type_of(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
