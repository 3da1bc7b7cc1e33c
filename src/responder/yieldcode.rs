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

//! The small set of codes a response-side `yield_value` call can carry,
//! mirroring `CONN_CORO_*` in the reference implementation.

/// The coroutine may be resumed again whenever the host schedules it
/// (e.g. the client is ready for another chunk or SSE event).
pub const CONN_CORO_MAY_RESUME: i32 = 0;

/// The coroutine should be torn down; the connection is being aborted
/// (e.g. a chunk-size computation overflowed its buffer).
pub const CONN_CORO_ABORT: i32 = -1;

/// The coroutine is waiting for the socket to become readable before it
/// can make progress.
pub const CONN_CORO_WANT_READ: i32 = 1;

/// The coroutine is waiting for the socket to become writable before it
/// can make progress.
pub const CONN_CORO_WANT_WRITE: i32 = 2;
