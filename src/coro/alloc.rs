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

//! Raw allocation helpers that piggyback on a `Coro`'s deferred-cleanup
//! stack, mirroring `coro_malloc`/`coro_strdup`/`coro_strndup`/
//! `coro_printf` in the reference runtime: memory handed out here is
//! valid until the matching deferred generation unwinds, with no
//! explicit free required at the call site.

use std::alloc::{self, Layout};
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use super::defer::DeferredAction;
use super::Coro;

/// Allocate `len` bytes that will be freed automatically the next time
/// `coro`'s deferred stack unwinds past the current generation.
///
/// Returns `None` on allocation failure, matching `coro_malloc`'s NULL
/// return rather than aborting.
pub fn coro_malloc(coro: &mut Coro, len: usize) -> Option<*mut u8> {
    if len == 0 {
        return None;
    }
    let layout = Layout::array::<u8>(len).ok()?;
    let ptr = unsafe { alloc::alloc(layout) };
    if ptr.is_null() {
        return None;
    }

    coro.defer(DeferredAction::new(move || unsafe {
        alloc::dealloc(ptr, layout);
    }));

    Some(ptr)
}

/// Copy `s` into coroutine-owned, NUL-terminated storage, returning a raw
/// `c_char` pointer valid until the next unwind past the current
/// generation. Mirrors `coro_strdup`.
pub fn coro_strdup(coro: &mut Coro, s: &str) -> Option<*mut c_char> {
    coro_strndup(coro, s, s.len())
}

/// As `coro_strdup`, but copies at most `max_len` bytes of `s` before
/// terminating, mirroring `coro_strndup`.
pub fn coro_strndup(coro: &mut Coro, s: &str, max_len: usize) -> Option<*mut c_char> {
    let truncated = if s.len() > max_len { &s[..max_len] } else { s };
    let cstring = CString::new(truncated).ok()?;
    let bytes = cstring.as_bytes_with_nul();

    let layout = Layout::array::<u8>(bytes.len()).ok()?;
    let ptr = unsafe { alloc::alloc(layout) };
    if ptr.is_null() {
        return None;
    }
    unsafe {
        ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len());
    }

    coro.defer(DeferredAction::new(move || unsafe {
        alloc::dealloc(ptr, layout);
    }));

    Some(ptr as *mut c_char)
}

/// Format `args` the way `coro_printf` does: into coroutine-owned storage
/// valid until the next deferred unwind.
pub fn coro_printf(coro: &mut Coro, args: std::fmt::Arguments<'_>) -> Option<*mut c_char> {
    let formatted = std::fmt::format(args);
    coro_strdup(coro, &formatted)
}

#[cfg(test)]
mod tests {
    use super::super::switcher::Switcher;
    use super::super::Coro;
    use super::*;

    fn make_coro() -> (Switcher, Box<Coro>) {
        let switcher = Switcher::new();
        let coro = Coro::new(32 * 1024, |_: &mut Coro| 0).expect("coro should allocate");
        (switcher, coro)
    }

    #[test]
    fn malloc_is_freed_on_unwind() {
        let (_switcher, mut coro) = make_coro();
        let gen = coro.deferred_generation();
        let ptr = coro_malloc(&mut coro, 64).expect("alloc should succeed");
        assert!(!ptr.is_null());
        coro.deferred_run(gen);
    }

    #[test]
    fn strdup_round_trips_the_contents() {
        let (_switcher, mut coro) = make_coro();
        let ptr = coro_strdup(&mut coro, "hello").expect("strdup should succeed");
        let back = unsafe { std::ffi::CStr::from_ptr(ptr) };
        assert_eq!(back.to_str().unwrap(), "hello");
    }

    #[test]
    fn strndup_truncates() {
        let (_switcher, mut coro) = make_coro();
        let ptr = coro_strndup(&mut coro, "hello world", 5).expect("strndup should succeed");
        let back = unsafe { std::ffi::CStr::from_ptr(ptr) };
        assert_eq!(back.to_str().unwrap(), "hello");
    }

    #[test]
    fn printf_formats_into_owned_storage() {
        let (_switcher, mut coro) = make_coro();
        let ptr = coro_printf(&mut coro, format_args!("{}-{}", "n", 42)).unwrap();
        let back = unsafe { std::ffi::CStr::from_ptr(ptr) };
        assert_eq!(back.to_str().unwrap(), "n-42");
    }
}
