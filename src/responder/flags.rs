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

use bitflags::bitflags;

bitflags! {
    /// Per-request flags, mirroring the `request->flags` bitset in the
    /// reference implementation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RequestFlags: u32 {
        /// The request line was `HTTP/1.0`; affects the status line and
        /// the default keep-alive behavior.
        const HTTP_1_0             = 1 << 0;
        /// At least one byte of the header block has been written for
        /// this response; a second header write is a logic error, not a
        /// retry.
        const RESPONSE_SENT_HEADERS    = 1 << 1;
        /// Response framing is `Transfer-Encoding: chunked`, not
        /// `Content-Length`.
        const RESPONSE_CHUNKED_ENCODING = 1 << 2;
        /// No framing header should be emitted at all (used for streamed
        /// responses whose total length is not fixed ahead of time, such
        /// as SSE).
        const RESPONSE_NO_CONTENT_LENGTH = 1 << 3;
        /// Emit the CORS header block.
        const ALLOW_CORS = 1 << 4;
    }
}

bitflags! {
    /// Per-connection flags, mirroring `conn->flags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ConnFlags: u32 {
        /// Connection should be kept open (pipelined reuse) after this
        /// response completes.
        const KEEP_ALIVE = 1 << 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_compose_and_query_independently() {
        let mut flags = RequestFlags::HTTP_1_0;
        assert!(flags.contains(RequestFlags::HTTP_1_0));
        assert!(!flags.contains(RequestFlags::ALLOW_CORS));

        flags |= RequestFlags::ALLOW_CORS;
        assert!(flags.contains(RequestFlags::ALLOW_CORS));
        assert!(flags.contains(RequestFlags::HTTP_1_0));
    }
}
