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

use corowire::responder::datecache::DateCache;
use corowire::responder::flags::{ConnFlags, RequestFlags};
use corowire::responder::request::{detached_request, Method, RequestMeta};
use corowire::responder::sink::InMemorySink;
use corowire::responder::{self, status};

fn init() {
    let _ = env_logger::try_init();
}

fn meta(method: Method, url: &str) -> RequestMeta {
    RequestMeta {
        method,
        original_url: url.to_string(),
        remote_address: "127.0.0.1".to_string(),
    }
}

#[test]
fn s1_plain_response_with_keep_alive() {
    init();
    let date = DateCache::new().unwrap();
    let mut request = detached_request(meta(Method::Get, "/"), &date);
    request.conn_flags = ConnFlags::KEEP_ALIVE;
    request.response.mime_type = Some("text/plain");
    request.buffer.append_str("hi");

    let mut sink = InMemorySink::new();
    responder::response(&mut request, &status::OK, &mut sink);

    let wire = sink.as_str();
    assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(wire.contains("\r\nContent-Length: 2"));
    assert!(wire.contains("\r\nContent-Type: text/plain"));
    assert!(wire.contains("\r\nConnection: keep-alive"));
    assert!(wire.contains(&format!("\r\nDate: {}", date.date_str())));
    assert!(wire.contains(&format!("\r\nExpires: {}", date.expires_str())));
    assert!(wire.ends_with("\r\n\r\nhi"));
}

#[test]
fn s2_default_error_page_for_http_1_0() {
    init();
    let date = DateCache::new().unwrap();
    let mut request = detached_request(meta(Method::Get, "/"), &date);
    request.flags |= RequestFlags::HTTP_1_0;

    let mut sink = InMemorySink::new();
    responder::response(&mut request, &status::NOT_FOUND, &mut sink);

    let wire = sink.as_str();
    assert!(wire.starts_with("HTTP/1.0 404 Not Found\r\n"));
    assert!(wire.contains("\r\nContent-Type: text/html"));
    assert!(wire.contains("<h1>Not Found</h1>"));
    assert!(wire.contains("The requested resource could not be found."));
}

#[test]
fn s3_chunked_stream_ends_with_zero_length_chunk() {
    init();
    let date = DateCache::new().unwrap();
    let mut request = detached_request(meta(Method::Get, "/stream"), &date);

    let mut sink = InMemorySink::new();

    request.buffer.append_str("A");
    responder::send_chunk(&mut request, &mut sink);

    request.buffer.append_str("BB");
    responder::send_chunk(&mut request, &mut sink);

    responder::response(&mut request, &status::OK, &mut sink);

    let wire = sink.as_str();
    assert!(wire.contains("Transfer-Encoding: chunked"));
    assert!(wire.ends_with("1\r\nA\r\n2\r\nBB\r\n0\r\n\r\n"));
}

#[test]
fn s4_sse_frame_then_heartbeat() {
    init();
    let date = DateCache::new().unwrap();
    let mut request = detached_request(meta(Method::Get, "/events"), &date);

    let mut sink = InMemorySink::new();

    request.buffer.append_str("1");
    responder::send_event(&mut request, Some("tick"), &mut sink);

    responder::send_event(&mut request, None, &mut sink);

    let wire = sink.as_str();
    assert!(wire.contains("event: tick\r\ndata: 1\r\n\r\n"));
    assert!(wire.ends_with("\r\n\r\n"));
}

#[test]
fn s5_cors_headers_appear_after_connection_and_date() {
    init();
    let date = DateCache::new().unwrap();
    let mut request = detached_request(meta(Method::Post, "/"), &date);
    request.flags |= RequestFlags::ALLOW_CORS;
    request.response.mime_type = Some("text/plain");
    request.buffer.append_str("ok");

    let mut sink = InMemorySink::new();
    responder::response(&mut request, &status::OK, &mut sink);

    let wire = sink.as_str();
    let connection_at = wire.find("Connection:").unwrap();
    let cors_at = wire.find("Access-Control-Allow-Origin: *").unwrap();
    let date_at = wire.find("Date:").unwrap();

    assert!(connection_at < cors_at);
    assert!(date_at < cors_at);
    assert!(wire.contains("Access-Control-Allow-Origin: *"));
    assert!(wire.contains("Access-Control-Allow-Methods: GET, POST, OPTIONS"));
    assert!(wire.contains("Access-Control-Allow-Credentials: true"));
    assert!(wire.contains("Access-Control-Allow-Headers: Origin, Accept, Content-Type"));
}

#[test]
fn property_7_set_chunked_refuses_once_headers_are_sent() {
    init();
    let date = DateCache::new().unwrap();
    let mut request = detached_request(meta(Method::Get, "/"), &date);
    request.response.mime_type = Some("text/plain");

    let mut sink = InMemorySink::new();
    assert!(responder::set_chunked(&mut request, &status::OK, &mut sink));

    let before = sink.as_bytes().len();
    assert!(!responder::set_chunked(&mut request, &status::OK, &mut sink));
    assert!(!responder::set_event_stream(&mut request, &status::OK, &mut sink));
    assert_eq!(sink.as_bytes().len(), before);
}

#[test]
fn property_10_server_is_filtered_date_and_expires_overrides_are_honored() {
    init();
    let date = DateCache::new().unwrap();
    let mut request = detached_request(meta(Method::Get, "/"), &date);
    request.response.mime_type = Some("text/plain");
    request
        .response
        .additional_headers
        .push(("Server".to_string(), "evil".to_string()));
    request
        .response
        .additional_headers
        .push(("Date".to_string(), "override-date".to_string()));
    request
        .response
        .additional_headers
        .push(("Expires".to_string(), "override-expires".to_string()));

    let headers = responder::prepare_response_header_full(&request, &status::OK).unwrap();

    assert!(!headers.contains("Server: evil"));
    assert!(headers.contains("Date: override-date"));
    assert!(headers.contains("Expires: override-expires"));
    assert!(!headers.contains(&date.date_str().to_string()));
}

#[test]
fn property_11_unauthorized_only_forwards_www_authenticate() {
    init();
    let date = DateCache::new().unwrap();
    let mut request = detached_request(meta(Method::Get, "/"), &date);
    request.response.mime_type = Some("text/plain");
    request
        .response
        .additional_headers
        .push(("X-Debug".to_string(), "1".to_string()));
    request
        .response
        .additional_headers
        .push(("WWW-Authenticate".to_string(), "Basic".to_string()));

    let headers =
        responder::prepare_response_header_full(&request, &status::NOT_AUTHORIZED).unwrap();

    assert!(headers.contains("WWW-Authenticate: Basic"));
    assert!(!headers.contains("X-Debug"));
}
