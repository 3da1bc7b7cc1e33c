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

//! The HTTP/1.x response-formatting engine: header assembly, plain and
//! chunked body delivery, and Server-Sent Events, all driven through a
//! [`ByteSink`] and coupled to a [`Coro`] at exactly the points where a
//! real implementation would suspend on backpressure.

pub mod datecache;
pub mod flags;
pub mod request;
pub mod sink;
pub mod status;
pub mod strbuf;
pub mod template;
pub mod yieldcode;

use std::path::PathBuf;

use log::debug;

use crate::coro::stack;
use crate::error::Result;
use crate::responder::flags::RequestFlags;
use crate::responder::request::Request;
use crate::responder::sink::ByteSink;
use crate::responder::status::Status;
use crate::responder::template::ErrorTemplate;
use crate::responder::yieldcode::CONN_CORO_MAY_RESUME;

const HTTP_BAD_REQUEST_CODE: u16 = 400;

const SERVER_HEADER: &str = "\r\nServer: lwan\r\n\r\n";

/// Caller-tunable knobs for a worker's Responder/Coro setup: an optional
/// error-template file override (the built-in template is used when
/// absent) and the stack size new coroutines get, floored at
/// `stack::min_stack_size` the same way `Coro::new` floors whatever it's
/// given.
pub struct ResponderConfig {
    pub template_path: Option<PathBuf>,
    pub stack_size: usize,
}

impl ResponderConfig {
    pub fn new() -> ResponderConfig {
        ResponderConfig {
            template_path: None,
            stack_size: stack::min_stack_size(),
        }
    }

    /// Compile the configured error template, falling back to the
    /// built-in one when no path override is set.
    pub fn load_template(&self) -> Result<ErrorTemplate> {
        match &self.template_path {
            Some(path) => ErrorTemplate::compile_file(path),
            None => ErrorTemplate::compile_builtin(),
        }
    }
}

impl Default for ResponderConfig {
    fn default() -> ResponderConfig {
        ResponderConfig::new()
    }
}

fn log_request(request: &Request<'_>, status: &Status) {
    debug!(
        "{} [{}] \"{} {} HTTP/{}\" {} {}",
        request.meta.remote_address,
        request.date.date_str(),
        request.meta.method.as_str(),
        request.meta.original_url,
        if request.is_http_1_0() { "1.0" } else { "1.1" },
        status.code,
        request.response.mime_type.unwrap_or("-"),
    );
}

/// Assemble the full response header block into a `String`, honoring
/// every flag/override the reference `lwan_prepare_response_header_full`
/// does. Returns `None` only if formatting the framing/date fields
/// somehow produced an internally inconsistent result (never expected in
/// practice; kept as `Option` to mirror the original's buffer-overflow
/// sentinel, which a growable `String` can't itself trigger).
pub fn prepare_response_header_full(request: &Request<'_>, status: &Status) -> Option<String> {
    let mut headers = String::with_capacity(256);

    headers.push_str(if request.is_http_1_0() {
        "HTTP/1.0 "
    } else {
        "HTTP/1.1 "
    });
    headers.push_str(&status::status_as_string_with_code(status));

    if request.flags.contains(RequestFlags::RESPONSE_CHUNKED_ENCODING) {
        headers.push_str("\r\nTransfer-Encoding: chunked");
    } else if request.flags.contains(RequestFlags::RESPONSE_NO_CONTENT_LENGTH) {
        // No framing header at all: caller is responsible for the
        // transport knowing when the body ends (e.g. connection close).
    } else {
        let length = request
            .response
            .content_length
            .unwrap_or_else(|| request.buffer.get_length());
        headers.push_str("\r\nContent-Length: ");
        headers.push_str(&length.to_string());
    }

    headers.push_str("\r\nContent-Type: ");
    headers.push_str(request.response.mime_type.unwrap_or("text/plain"));

    if request.is_keep_alive() {
        headers.push_str("\r\nConnection: keep-alive");
    } else {
        headers.push_str("\r\nConnection: close");
    }

    let mut date_overridden = false;
    let mut expires_overridden = false;

    if status.code < HTTP_BAD_REQUEST_CODE {
        for (key, value) in &request.response.additional_headers {
            if key.eq_ignore_ascii_case("Server") {
                continue;
            }
            if key.eq_ignore_ascii_case("Date") {
                date_overridden = true;
            }
            if key.eq_ignore_ascii_case("Expires") {
                expires_overridden = true;
            }
            headers.push_str("\r\n");
            headers.push_str(key);
            headers.push_str(": ");
            headers.push_str(value);
        }
    } else if status.code == status::NOT_AUTHORIZED.code {
        if let Some((_, value)) = request
            .response
            .additional_headers
            .iter()
            .find(|(key, _)| key == "WWW-Authenticate")
        {
            headers.push_str("\r\nWWW-Authenticate: ");
            headers.push_str(value);
        }
    }

    if !date_overridden {
        headers.push_str("\r\nDate: ");
        headers.push_str(request.date.date_str());
    }
    if !expires_overridden {
        headers.push_str("\r\nExpires: ");
        headers.push_str(request.date.expires_str());
    }

    if request.flags.contains(RequestFlags::ALLOW_CORS) {
        headers.push_str(
            "\r\nAccess-Control-Allow-Origin: *\
             \r\nAccess-Control-Allow-Methods: GET, POST, OPTIONS\
             \r\nAccess-Control-Allow-Credentials: true\
             \r\nAccess-Control-Allow-Headers: Origin, Accept, Content-Type",
        );
    }

    headers.push_str(SERVER_HEADER);

    Some(headers)
}

/// Send the final response: headers (if not already sent) followed by
/// the body, or the terminating zero-length chunk if already in chunked
/// mode. Mirrors `lwan_response`.
pub fn response(request: &mut Request<'_>, status: &Status, sink: &mut dyn ByteSink) {
    if request.flags.contains(RequestFlags::RESPONSE_CHUNKED_ENCODING) {
        request.buffer.reset();
        send_chunk(request, sink);
        log_request(request, status);
        return;
    }

    if request.headers_sent() {
        debug!("corowire: headers already sent, ignoring call");
        return;
    }

    if request.response.mime_type.is_none() {
        default_response(request, status, sink);
        return;
    }

    log_request(request, status);

    if let Some(mut callback) = request.response.stream_callback.take() {
        let callback_status = callback(request);
        if callback_status.code >= HTTP_BAD_REQUEST_CODE {
            default_response(request, callback_status, sink);
        }
        return;
    }

    let headers = match prepare_response_header_full(request, status) {
        Some(h) => h,
        None => {
            default_response(request, &status::INTERNAL_ERROR, sink);
            return;
        }
    };
    request.flags |= RequestFlags::RESPONSE_SENT_HEADERS;

    if request.meta.method.has_response_body() {
        sink.writev(&[headers.as_bytes(), request.buffer.get_buffer()]);
    } else {
        sink.send(headers.as_bytes());
    }
}

/// Render the built-in (or configured) error page and send it as the
/// response body. Mirrors `lwan_default_response`.
pub fn default_response(request: &mut Request<'_>, status: &Status, sink: &mut dyn ByteSink) {
    default_response_with_template(request, status, sink, None)
}

/// As `default_response`, but with an explicit template rather than one
/// compiled fresh -- the form `Responder` actually calls, since
/// recompiling the built-in HTML per response would be wasteful.
pub fn default_response_with_template(
    request: &mut Request<'_>,
    status: &Status,
    sink: &mut dyn ByteSink,
    template: Option<&ErrorTemplate>,
) {
    request.response.mime_type = Some("text/html");
    request.buffer.reset();

    let short = status::status_as_string(status);
    let long = status::status_as_descriptive_string(status);

    match template {
        Some(tpl) => tpl.apply_with_buffer(&mut request.buffer, short, long),
        None => {
            if let Ok(tpl) = ErrorTemplate::compile_builtin() {
                tpl.apply_with_buffer(&mut request.buffer, short, long)
            }
        }
    }

    response(request, status, sink);
}

/// Switch this response into chunked mode and send the header block.
/// Returns `false` if headers were already sent. Mirrors
/// `lwan_response_set_chunked`.
pub fn set_chunked(request: &mut Request<'_>, status: &Status, sink: &mut dyn ByteSink) -> bool {
    if request.headers_sent() {
        return false;
    }

    request.flags |= RequestFlags::RESPONSE_CHUNKED_ENCODING;
    let headers = match prepare_response_header_full(request, status) {
        Some(h) => h,
        None => return false,
    };

    request.flags |= RequestFlags::RESPONSE_SENT_HEADERS;
    sink.send(headers.as_bytes());
    true
}

/// Flush the current buffer contents as one chunk (`<hex-len>\r\n<bytes>
/// \r\n`), or the terminating zero-length chunk if the buffer is empty.
/// Yields the owning coroutine with `CONN_CORO_MAY_RESUME` afterwards.
/// Mirrors `lwan_response_send_chunk`.
pub fn send_chunk(request: &mut Request<'_>, sink: &mut dyn ByteSink) {
    if !request.headers_sent() && !set_chunked(request, &status::OK, sink) {
        return;
    }

    let len = request.buffer.get_length();
    if len == 0 {
        sink.send(b"0\r\n\r\n");
        return;
    }

    let chunk_size = format!("{len:x}\r\n");
    sink.writev(&[chunk_size.as_bytes(), request.buffer.get_buffer(), b"\r\n"]);

    request.buffer.reset();
    request.yield_to_host(CONN_CORO_MAY_RESUME);
}

/// Switch this response into `text/event-stream` mode and send the
/// header block. Mirrors `lwan_response_set_event_stream`.
pub fn set_event_stream(
    request: &mut Request<'_>,
    status: &Status,
    sink: &mut dyn ByteSink,
) -> bool {
    if request.headers_sent() {
        return false;
    }

    request.response.mime_type = Some("text/event-stream");
    request.flags |= RequestFlags::RESPONSE_NO_CONTENT_LENGTH;

    let headers = match prepare_response_header_full(request, status) {
        Some(h) => h,
        None => return false,
    };

    request.flags |= RequestFlags::RESPONSE_SENT_HEADERS;
    sink.send(headers.as_bytes());
    true
}

/// Send one SSE frame: an optional `event: <name>\r\n`, then
/// `data: <buffer>\r\n` if the buffer is non-empty, then a blank line.
/// Yields with `CONN_CORO_MAY_RESUME` afterwards. Mirrors
/// `lwan_response_send_event`.
pub fn send_event(request: &mut Request<'_>, event: Option<&str>, sink: &mut dyn ByteSink) {
    if !request.headers_sent() && !set_event_stream(request, &status::OK, sink) {
        return;
    }

    let mut frame: Vec<&[u8]> = Vec::with_capacity(4);
    if let Some(name) = event {
        frame.push(b"event: ");
        frame.push(name.as_bytes());
        frame.push(b"\r\n");
    }

    let len = request.buffer.get_length();
    if len > 0 {
        frame.push(b"data: ");
        frame.push(request.buffer.get_buffer());
    }
    frame.push(b"\r\n\r\n");

    sink.writev(&frame);

    request.buffer.reset();
    request.yield_to_host(CONN_CORO_MAY_RESUME);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_floors_stack_size_and_falls_back_to_builtin_template() {
        let config = ResponderConfig::new();
        assert_eq!(config.stack_size, stack::min_stack_size());
        assert!(config.template_path.is_none());

        let template = config.load_template().unwrap();
        let mut buffer = crate::responder::strbuf::StrBuf::new();
        template.apply_with_buffer(&mut buffer, "Not Found", "gone");
        let rendered = std::str::from_utf8(buffer.get_buffer()).unwrap();
        assert!(rendered.contains("<h1>Not Found</h1>"));
    }
}
