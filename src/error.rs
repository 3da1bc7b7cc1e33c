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

use std::fmt;

/// Crate-wide error type.
///
/// Most of the hot-path operations (coroutine construction, header
/// formatting) are not modeled with this type: they return `Option`/`bool`
/// directly, because the caller's response to failure is fixed and
/// immediate (reject the connection, escalate to a default response) and
/// not worth a `match` on a reason. `Error` covers the smaller set of
/// operations where the reason matters: template compilation and date
/// formatting.
#[derive(Debug)]
pub enum Error {
    /// The error-page template could not be compiled, either because the
    /// configured file could not be read or because the template syntax
    /// itself (built-in or user supplied) was malformed.
    Template(String),

    /// The per-worker date cache could not render a timestamp.
    DateFormat(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(msg) => write!(f, "template error: {msg}"),
            Error::DateFormat(msg) => write!(f, "date formatting error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
