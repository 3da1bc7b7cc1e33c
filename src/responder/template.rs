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

//! The default error-page template: a `{{short_message}}`/
//! `{{long_message}}` substitution, compiled once per worker and applied
//! for every handler-less error response.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::responder::strbuf::StrBuf;

const BUILT_IN_TEMPLATE: &str = "<html><head><style>\
body{\
background:#627d4d;\
background:-moz-radial-gradient(center,ellipse cover,#627d4d 15%,#1f3b08 100%);\
background:-webkit-gradient(radial,center center,0px,center center,100%,color-stop(15%,#627d4d),color-stop(100%,#1f3b08));\
background:-webkit-radial-gradient(center,ellipse cover,#627d4d 15%,#1f3b08 100%);\
background:-o-radial-gradient(center,ellipse cover,#627d4d 15%,#1f3b08 100%);\
background:-ms-radial-gradient(center,ellipse cover,#627d4d 15%,#1f3b08 100%);\
background:radial-gradient(center,ellipse cover,#627d4d 15%,#1f3b08 100%);\
height:100%;font-family:Arial,'Helvetica Neue',Helvetica,sans-serif;text-align:center;border:0;letter-spacing:-1px;margin:0;padding:0}.sorry{color:#244837;font-size:18px;line-height:24px;text-shadow:0\
1px 1px rgba(255,255,255,0.33)}h1{color:#fff;font-size:30px;font-weight:700;text-shadow:0 1px 4px rgba(0,0,0,0.68);letter-spacing:-1px;margin:0}\
</style>\
</head>\
<body>\
<table height=\"100%\" width=\"100%\"><tr><td align=\"center\" valign=\"middle\">\
<div>\
<h1>{{short_message}}</h1>\
<div class=\"sorry\">\
<p>{{long_message}}</p>\
</div>\
</div>\
</td></tr></table>\
</body>\
</html>";

/// One parsed fragment: literal text, or a reference to one of the two
/// supported substitution variables.
enum Segment {
    Literal(String),
    ShortMessage,
    LongMessage,
}

pub struct ErrorTemplate {
    segments: Vec<Segment>,
}

impl ErrorTemplate {
    /// Compile the built-in template (verbatim from the reference
    /// implementation's `error_template_str`).
    pub fn compile_builtin() -> Result<ErrorTemplate> {
        Self::compile_string(BUILT_IN_TEMPLATE)
    }

    pub fn compile_file(path: &Path) -> Result<ErrorTemplate> {
        let contents = fs::read_to_string(path)
            .map_err(|err| Error::Template(format!("could not read {}: {err}", path.display())))?;
        Self::compile_string(&contents)
    }

    pub fn compile_string(source: &str) -> Result<ErrorTemplate> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after_open = &rest[start + 2..];
            let end = after_open
                .find("}}")
                .ok_or_else(|| Error::Template("unterminated {{ variable reference".into()))?;
            let name = after_open[..end].trim();
            segments.push(match name {
                "short_message" => Segment::ShortMessage,
                "long_message" => Segment::LongMessage,
                other => {
                    return Err(Error::Template(format!("unknown template variable {other}")))
                }
            });
            rest = &after_open[end + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(ErrorTemplate { segments })
    }

    /// Render into `buffer`, replacing the two known variables and
    /// leaving everything else untouched. `buffer` is not reset first:
    /// callers that want a clean slate call `StrBuf::reset` themselves.
    pub fn apply_with_buffer(&self, buffer: &mut StrBuf, short_message: &str, long_message: &str) {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => buffer.append_str(text),
                Segment::ShortMessage => buffer.append_str(short_message),
                Segment::LongMessage => buffer.append_str(long_message),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_template_compiles_and_substitutes() {
        let template = ErrorTemplate::compile_builtin().unwrap();
        let mut buffer = StrBuf::new();
        template.apply_with_buffer(&mut buffer, "Not Found", "The requested resource could not be found.");

        let rendered = std::str::from_utf8(buffer.get_buffer()).unwrap();
        assert!(rendered.contains("<h1>Not Found</h1>"));
        assert!(rendered.contains("The requested resource could not be found."));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn rejects_unknown_variables() {
        let err = ErrorTemplate::compile_string("{{nonexistent}}").unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }

    #[test]
    fn rejects_unterminated_variable_reference() {
        let err = ErrorTemplate::compile_string("hello {{short_message").unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }
}
