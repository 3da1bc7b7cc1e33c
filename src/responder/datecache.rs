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

//! A per-worker cache of the two RFC 1123 date strings every response
//! header carries (`Date`, `Expires`), refreshed on demand rather than
//! formatted fresh for every response.

use crate::error::{Error, Result};

const RFC1123_LEN: usize = 29;
const EXPIRES_OFFSET_SECS: libc::time_t = 3600;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Two fixed-width 29-byte RFC 1123 GMT timestamps: `date` (now) and
/// `expires` (now plus a fixed TTL), exactly the shape the original
/// request-thread struct carries.
pub struct DateCache {
    pub date: [u8; RFC1123_LEN],
    pub expires: [u8; RFC1123_LEN],
    last_refreshed: libc::time_t,
}

impl DateCache {
    pub fn new() -> Result<DateCache> {
        let mut cache = DateCache {
            date: [0; RFC1123_LEN],
            expires: [0; RFC1123_LEN],
            last_refreshed: 0,
        };
        cache.refresh()?;
        Ok(cache)
    }

    /// Re-render both strings from the current wall clock. Call at most
    /// once per second per worker; cheap to call more often, just
    /// redundant.
    pub fn refresh(&mut self) -> Result<()> {
        let now = unsafe { libc::time(std::ptr::null_mut()) };
        if now == self.last_refreshed && self.date[0] != 0 {
            return Ok(());
        }

        render_rfc1123(now, &mut self.date)?;
        render_rfc1123(now + EXPIRES_OFFSET_SECS, &mut self.expires)?;
        self.last_refreshed = now;
        Ok(())
    }

    pub fn date_str(&self) -> &str {
        std::str::from_utf8(&self.date).unwrap_or("")
    }

    pub fn expires_str(&self) -> &str {
        std::str::from_utf8(&self.expires).unwrap_or("")
    }
}

fn render_rfc1123(when: libc::time_t, out: &mut [u8; RFC1123_LEN]) -> Result<()> {
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::gmtime_r(&when, &mut tm) };
    if rc.is_null() {
        return Err(Error::DateFormat(format!(
            "gmtime_r failed for timestamp {when}"
        )));
    }

    let weekday = WEEKDAYS
        .get(tm.tm_wday as usize)
        .copied()
        .ok_or_else(|| Error::DateFormat("gmtime_r returned an out-of-range weekday".into()))?;
    let month = MONTHS
        .get(tm.tm_mon as usize)
        .copied()
        .ok_or_else(|| Error::DateFormat("gmtime_r returned an out-of-range month".into()))?;

    let rendered = format!(
        "{}, {:02} {} {:04} {:02}:{:02}:{:02} GMT",
        weekday,
        tm.tm_mday,
        month,
        tm.tm_year + 1900,
        tm.tm_hour,
        tm.tm_min,
        tm.tm_sec,
    );

    let bytes = rendered.as_bytes();
    if bytes.len() != RFC1123_LEN {
        return Err(Error::DateFormat(format!(
            "rendered RFC 1123 date had unexpected length {}",
            bytes.len()
        )));
    }
    out.copy_from_slice(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fixed_width_rfc1123_strings() {
        let cache = DateCache::new().expect("date cache should initialize");
        assert_eq!(cache.date_str().len(), RFC1123_LEN);
        assert!(cache.date_str().ends_with(" GMT"));
        assert_eq!(cache.expires_str().len(), RFC1123_LEN);
    }

    #[test]
    fn expires_is_later_than_date() {
        let cache = DateCache::new().unwrap();
        assert_ne!(cache.date_str(), cache.expires_str());
    }
}
