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

//! A coroutine's private execution stack: a guard-paged `mmap` region, the
//! same shape as the teacher crate's `stack_protected::Stack`, sized with
//! a `CORO_STACK_MIN` floor (`3 * PTHREAD_STACK_MIN / 2`, never below
//! 24 KiB).

use std::fmt;
use std::ptr;

use log::warn;

/// Lower bound for a coroutine stack, mirroring `CORO_STACK_MIN` in the
/// original: at least one and a half pthread minimum stacks, and never
/// below 24 KiB.
pub fn min_stack_size() -> usize {
    const FLOOR: usize = 24 * 1024;

    let pthread_min = unsafe { libc::sysconf(libc::_SC_THREAD_STACK_MIN) };
    let pthread_min = if pthread_min > 0 {
        pthread_min as usize
    } else {
        16 * 1024
    };

    let computed = (3 * pthread_min) / 2;
    computed.max(FLOOR)
}

fn page_size() -> usize {
    let sz = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if sz > 0 {
        sz as usize
    } else {
        4096
    }
}

fn round_up(from: usize, to: usize) -> usize {
    if from % to == 0 {
        from.max(to)
    } else {
        from + to - (from % to)
    }
}

/// A private, guard-paged execution stack for one `Coro`.
///
/// The stack grows down from `end()` towards `start()`; the single page at
/// `start()` is `mprotect`-ed `PROT_NONE` so that a stack overflow faults
/// instead of silently corrupting adjacent memory.
pub struct CoroStack {
    base: *mut libc::c_void,
    len: usize,
    min_size: usize,
}

impl fmt::Debug for CoroStack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CoroStack")
            .field("base", &self.base)
            .field("len", &self.len)
            .field("min_size", &self.min_size)
            .finish()
    }
}

#[cfg(not(any(target_os = "freebsd", target_os = "dragonfly")))]
const STACK_FLAGS: libc::c_int = libc::MAP_STACK | libc::MAP_PRIVATE | libc::MAP_ANON;
#[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
const STACK_FLAGS: libc::c_int = libc::MAP_PRIVATE | libc::MAP_ANON;

impl CoroStack {
    /// Allocate a stack able to hold at least `min_size` bytes, rounded up
    /// to a whole number of pages. Returns `None` on `mmap`/`mprotect`
    /// failure: construction failure is a null/`None` sentinel, never a
    /// panic.
    pub fn new(min_size: usize) -> Option<CoroStack> {
        let page = page_size();
        let len = round_up(min_size, page);

        let base = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                STACK_FLAGS,
                -1,
                0,
            )
        };

        if base == libc::MAP_FAILED {
            return None;
        }

        // The lowest page becomes the guard page: the stack grows down
        // from `base + len` towards `base`, so a faulting access into the
        // guard page means the coroutine overflowed its stack.
        let rc = unsafe { libc::mprotect(base, page, libc::PROT_NONE) };
        if rc != 0 {
            warn!("corowire: could not install coroutine guard page, unmapping stack");
            unsafe {
                libc::munmap(base, len);
            }
            return None;
        }

        Some(CoroStack {
            base,
            len,
            min_size,
        })
    }

    /// Low end of the mapping (the guard page lives here).
    pub fn start(&self) -> *mut u8 {
        self.base as *mut u8
    }

    /// One byte past the high end: the initial stack pointer value, since
    /// the stack grows down on every architecture this crate targets.
    pub fn top(&self) -> *mut u8 {
        unsafe { (self.base as *mut u8).add(self.len) }
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }
}

impl Drop for CoroStack {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.base, self.len);
        }
    }
}

// Coroutine stacks are moved between pooled `Coro`s on the same thread
// only; nothing here is accessed concurrently.
unsafe impl Send for CoroStack {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_at_least_the_requested_size() {
        let stack = CoroStack::new(32 * 1024).expect("mmap should succeed");
        assert!(stack.min_size() == 32 * 1024);
        assert!(stack.top() as usize > stack.start() as usize);
    }

    #[test]
    fn floor_matches_spec_minimum() {
        assert!(min_stack_size() >= 24 * 1024);
    }
}
