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

//! A growable response-body buffer, mirroring `lwan_strbuf`'s
//! `get_buffer`/`get_length`/`reset` surface.

use std::fmt::Write as _;

#[derive(Debug, Default, Clone)]
pub struct StrBuf {
    bytes: Vec<u8>,
}

impl StrBuf {
    pub fn new() -> StrBuf {
        StrBuf { bytes: Vec::new() }
    }

    pub fn get_buffer(&self) -> &[u8] {
        &self.bytes
    }

    pub fn get_length(&self) -> usize {
        self.bytes.len()
    }

    /// Truncate to empty without releasing the underlying allocation,
    /// matching `lwan_strbuf_reset`'s reuse-the-buffer behavior between
    /// chunks/events.
    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    pub fn append(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    pub fn append_str(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
    }

    pub fn append_fmt(&mut self, args: std::fmt::Arguments<'_>) {
        let mut scratch = String::new();
        let _ = scratch.write_fmt(args);
        self.append_str(&scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_empties_without_deallocating() {
        let mut buf = StrBuf::new();
        buf.append_str("hello");
        assert_eq!(buf.get_length(), 5);

        let cap_before = buf.bytes.capacity();
        buf.reset();
        assert_eq!(buf.get_length(), 0);
        assert_eq!(buf.bytes.capacity(), cap_before);
    }

    #[test]
    fn append_fmt_writes_formatted_text() {
        let mut buf = StrBuf::new();
        buf.append_fmt(format_args!("{}-{}", "n", 7));
        assert_eq!(buf.get_buffer(), b"n-7");
    }
}
