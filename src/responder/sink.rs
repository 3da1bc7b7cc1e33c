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

//! The byte-sink collaborator a Responder writes through, mirroring
//! `lwan_send`/`lwan_writev`. The real socket wrapper is an external
//! collaborator (outside this crate's scope); `InMemorySink` is a
//! reference implementation used by this crate's own tests.

/// Anything a Responder can write framed HTTP output to.
///
/// A real implementation backed by a non-blocking socket is expected to
/// yield the owning coroutine on `EWOULDBLOCK` and retry rather than
/// blocking the worker thread; this trait does not model that directly
/// since the retry loop lives in the caller (`Responder` methods are
/// given a `&mut Coro` for exactly that purpose).
pub trait ByteSink {
    /// Write `data` in full, or fail.
    fn send(&mut self, data: &[u8]) -> bool;

    /// Write each slice in `bufs`, in order, as a single logical write
    /// where the underlying transport supports it (`writev`-style).
    fn writev(&mut self, bufs: &[&[u8]]) -> bool {
        for buf in bufs {
            if !self.send(buf) {
                return false;
            }
        }
        true
    }
}

/// An in-memory `ByteSink`: everything written accumulates into a single
/// `Vec<u8>`. Used by this crate's tests to assert on exact wire bytes.
#[derive(Debug, Default)]
pub struct InMemorySink {
    written: Vec<u8>,
}

impl InMemorySink {
    pub fn new() -> InMemorySink {
        InMemorySink::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.written
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.written).unwrap_or("<non-utf8 bytes>")
    }
}

impl ByteSink for InMemorySink {
    fn send(&mut self, data: &[u8]) -> bool {
        self.written.extend_from_slice(data);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writev_concatenates_in_order() {
        let mut sink = InMemorySink::new();
        assert!(sink.writev(&[b"abc", b"def"]));
        assert_eq!(sink.as_bytes(), b"abcdef");
    }
}
