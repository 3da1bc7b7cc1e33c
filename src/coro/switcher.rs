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

use super::context::MachineContext;

/// Scratch pair of machine contexts used as the handoff slots between a
/// worker and whichever `Coro` it is currently resuming.
///
/// `caller` holds the worker's own register state while a coroutine runs;
/// `callee` is where a running coroutine's state lands the moment it
/// yields, before `Coro::resume` copies it into that coroutine's own
/// saved context. Both slots are reused by every `Coro` a worker thread
/// resumes, one at a time, in sequence -- a `Switcher` must never be
/// touched by two threads, nor used to resume two different `Coro`s
/// concurrently. Sharing it sequentially across many pooled coroutines is
/// exactly the point: it avoids allocating a pair of contexts per
/// connection.
pub struct Switcher {
    pub(crate) caller: MachineContext,
    pub(crate) callee: MachineContext,
}

impl Switcher {
    pub fn new() -> Switcher {
        Switcher {
            caller: MachineContext::new(),
            callee: MachineContext::new(),
        }
    }
}

impl Default for Switcher {
    fn default() -> Switcher {
        Switcher::new()
    }
}

// A `Switcher` is a worker-local scratch area; the runtime's own threading
// discipline (one worker resumes its own coroutines only) is what makes
// this sound, not `Sync`. It is explicitly not `Sync`.
unsafe impl Send for Switcher {}
