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

//! Per-connection execution core for an HTTP server: a stackful
//! coroutine runtime ([`coro`]) and an HTTP/1.x response-formatting
//! engine ([`responder`]) built on top of it.
//!
//! A typical worker owns one [`coro::switcher::Switcher`] and a pool of
//! [`coro::Coro`]s, one per in-flight connection; each coroutine's body
//! drives request handling through the free functions in [`responder`],
//! suspending at [`responder::send_chunk`]/[`responder::send_event`] (or
//! whenever its [`responder::sink::ByteSink`] would otherwise block).

pub mod coro;
pub mod error;
pub mod responder;

pub use coro::Coro;
pub use coro::switcher::Switcher;
pub use error::{Error, Result};
