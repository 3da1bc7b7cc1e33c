// The MIT License (MIT)

// Copyright (c) 2015 Rustcc developers

// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:

// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! HTTP status line rendering, mirroring `lwan_http_status_as_string`
//! and friends.

/// Numeric status code, short reason phrase, and a longer descriptive
/// message used by the built-in error template.
pub struct Status {
    pub code: u16,
    pub reason: &'static str,
    pub description: &'static str,
}

macro_rules! status_table {
    ($( $code:expr => $name:ident, $reason:expr, $description:expr; )*) => {
        $( pub const $name: Status = Status { code: $code, reason: $reason, description: $description }; )*

        /// Look up a status by numeric code; `None` for anything not in
        /// the table.
        pub const fn by_code(code: u16) -> Option<&'static Status> {
            match code {
                $( $code => Some(&$name), )*
                _ => None,
            }
        }
    };
}

status_table! {
    100 => CONTINUE, "Continue", "This interim response indicates that the client should continue the request.";
    101 => SWITCHING_PROTOCOLS, "Switching Protocols", "The requester has asked the server to switch protocols.";
    200 => OK, "OK", "The request has succeeded.";
    201 => CREATED, "Created", "The request has succeeded and a new resource has been created.";
    202 => ACCEPTED, "Accepted", "The request has been accepted for processing, but processing is not complete.";
    204 => NO_CONTENT, "No Content", "The server has fulfilled the request but has no content to send.";
    206 => PARTIAL_CONTENT, "Partial Content", "The server is delivering only part of the resource.";
    301 => MOVED_PERMANENTLY, "Moved Permanently", "This and all future requests should be directed to the given URI.";
    302 => FOUND, "Found", "The resource resides temporarily under a different URI.";
    304 => NOT_MODIFIED, "Not Modified", "Indicates that the resource has not been modified since last requested.";
    307 => TEMPORARY_REDIRECT, "Temporary Redirect", "The request should be repeated with another URI.";
    400 => BAD_REQUEST, "Bad Request", "The server cannot or will not process the request due to a client error.";
    401 => NOT_AUTHORIZED, "Unauthorized", "Authentication is required and has failed or has not yet been provided.";
    403 => FORBIDDEN, "Forbidden", "The request was valid, but the server is refusing to act on it.";
    404 => NOT_FOUND, "Not Found", "The requested resource could not be found.";
    405 => METHOD_NOT_ALLOWED, "Method Not Allowed", "The request method is not supported for the requested resource.";
    408 => REQUEST_TIMEOUT, "Request Timeout", "The server timed out waiting for the request.";
    413 => REQUEST_TOO_LARGE, "Payload Too Large", "The request is larger than the server is willing or able to process.";
    414 => URI_TOO_LONG, "URI Too Long", "The URI provided was too long for the server to process.";
    416 => RANGE_UNSATISFIABLE, "Range Not Satisfiable", "None of the ranges in the request's Range header overlap the resource.";
    417 => EXPECTATION_FAILED, "Expectation Failed", "The expectation given in the request's Expect header could not be met.";
    500 => INTERNAL_ERROR, "Internal Server Error", "The server encountered an unexpected condition.";
    501 => NOT_IMPLEMENTED, "Not Implemented", "The server does not support the functionality required to fulfill the request.";
    502 => BAD_GATEWAY, "Bad Gateway", "The server, acting as a gateway, received an invalid response.";
    503 => SERVICE_UNAVAILABLE, "Service Unavailable", "The server is not ready to handle the request.";
}

/// `"200 OK"`, for the status line.
pub fn status_as_string_with_code(status: &Status) -> String {
    format!("{} {}", status.code, status.reason)
}

/// `"OK"`, for the error-page template's `short_message` variable.
pub fn status_as_string(status: &Status) -> &'static str {
    status.reason
}

/// The longer descriptive sentence, for the error-page template's
/// `long_message` variable.
pub fn status_as_descriptive_string(status: &Status) -> &'static str {
    status.description
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_status_line_with_code_and_reason() {
        assert_eq!(status_as_string_with_code(&OK), "200 OK");
        assert_eq!(status_as_string_with_code(&NOT_FOUND), "404 Not Found");
    }

    #[test]
    fn looks_up_by_numeric_code() {
        assert_eq!(by_code(200).map(|s| s.reason), Some("OK"));
        assert!(by_code(999).is_none());
    }
}
