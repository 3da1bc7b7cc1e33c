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

//! Responder-visible request/response state: everything
//! `corowire::responder`'s free functions read or mutate while building
//! a response.

use std::ptr;

use crate::coro::Coro;
use crate::responder::datecache::DateCache;
use crate::responder::flags::{ConnFlags, RequestFlags};
use crate::responder::status::Status;
use crate::responder::strbuf::StrBuf;

/// HTTP request method, mirroring `enum lwan_request_method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Options,
    Delete,
    Unknown,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Options => "OPTIONS",
            Method::Delete => "DELETE",
            Method::Unknown => "UNKNOWN",
        }
    }

    /// Whether a response to this method carries a body, mirroring the
    /// reference implementation's `has_response_body` lookup table
    /// (there, a fixed array indexed by method; here, an equivalent
    /// exhaustive `const fn` match).
    pub const fn has_response_body(self) -> bool {
        matches!(self, Method::Get | Method::Post)
    }
}

/// Immutable request-line facts the Responder needs to log or render
/// headers: never mutated once the request is parsed.
pub struct RequestMeta {
    pub method: Method,
    pub original_url: String,
    pub remote_address: String,
}

/// A handler's response-stream callback: called once, then cleared, to
/// avoid the "eternal recursion on errors" the reference implementation
/// guards against explicitly.
pub type StreamCallback = Box<dyn FnMut(&mut Request) -> &'static Status>;

/// Response-side state a handler or the Responder mutates while building
/// the reply.
pub struct ResponseMeta {
    pub mime_type: Option<&'static str>,
    pub content_length: Option<usize>,
    pub additional_headers: Vec<(String, String)>,
    pub stream_callback: Option<StreamCallback>,
}

impl Default for ResponseMeta {
    fn default() -> Self {
        ResponseMeta {
            mime_type: None,
            content_length: None,
            additional_headers: Vec::new(),
            stream_callback: None,
        }
    }
}

/// Everything a Responder operation needs: flags, the response body
/// buffer, response/request metadata, a date cache, and a non-owning
/// pointer back to the coroutine driving this connection (so
/// `send_chunk`/`send_event` can yield).
pub struct Request<'a> {
    pub flags: RequestFlags,
    pub conn_flags: ConnFlags,
    pub buffer: StrBuf,
    pub response: ResponseMeta,
    pub meta: RequestMeta,
    pub date: &'a DateCache,
    coro: *mut Coro,
}

impl<'a> Request<'a> {
    pub fn new(meta: RequestMeta, date: &'a DateCache, coro: *mut Coro) -> Request<'a> {
        Request {
            flags: RequestFlags::empty(),
            conn_flags: ConnFlags::empty(),
            buffer: StrBuf::new(),
            response: ResponseMeta::default(),
            meta,
            date,
            coro,
        }
    }

    pub fn is_http_1_0(&self) -> bool {
        self.flags.contains(RequestFlags::HTTP_1_0)
    }

    pub fn headers_sent(&self) -> bool {
        self.flags.contains(RequestFlags::RESPONSE_SENT_HEADERS)
    }

    pub fn is_keep_alive(&self) -> bool {
        self.conn_flags.contains(ConnFlags::KEEP_ALIVE)
    }

    /// Suspend the owning coroutine, handing `value` to whatever resumes
    /// it next. Only valid to call from within that coroutine's body.
    ///
    /// A `Request` with no owning coroutine (see [`detached_request`]) has
    /// nothing to suspend into; such requests are for tests that only
    /// exercise header/body formatting, so this is a no-op rather than a
    /// panic.
    pub(crate) fn yield_to_host(&mut self, value: i32) -> i32 {
        if self.coro.is_null() {
            return value;
        }
        let coro = unsafe { &mut *self.coro };
        coro.yield_value(value)
    }
}

/// A `Request` with no owning coroutine, for unit tests that only
/// exercise header/body formatting and never call `send_chunk`/
/// `send_event`.
pub fn detached_request(meta: RequestMeta, date: &DateCache) -> Request<'_> {
    Request::new(meta, date, ptr::null_mut())
}
