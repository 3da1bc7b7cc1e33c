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

//! The per-connection stackful coroutine runtime: a `Coro` is a single
//! green thread with its own machine stack, resumed and yielded
//! cooperatively by a worker that owns a shared [`Switcher`].
//!
//! Modeled directly on the reference `coro_*` family: `Coro::new`/`reset`
//! install an entry point on a freshly mapped (or reused) stack,
//! `resume`/`resume_value` transfer control in, and `yield_value`
//! transfers it back out, carrying an `i32` status code each way.

pub mod alloc;
pub mod context;
pub mod defer;
pub mod stack;
pub mod switcher;

use std::fmt;
use std::ptr;

use context::{EntryFn, MachineContext};
use defer::{DeferredAction, DeferredStack};
use stack::CoroStack;
use switcher::Switcher;

type Body = dyn FnMut(&mut Coro) -> i32;

/// A single stackful coroutine.
///
/// `Coro` is always owned through a `Box` (see [`Coro::new`]): the entry
/// trampoline is handed a raw pointer to this struct's address, which
/// must never move once a first `resume` has installed it in the
/// machine context.
pub struct Coro {
    stack: CoroStack,
    context: MachineContext,
    defers: DeferredStack,
    body: Option<Box<Body>>,
    ended: bool,
    switcher: *mut Switcher,
    pending_value: i32,
}

impl fmt::Debug for Coro {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Coro")
            .field("ended", &self.ended)
            .field("pending_value", &self.pending_value)
            .finish()
    }
}

extern "C" fn entry_trampoline(coro_ptr: *mut u8) -> ! {
    let coro: &mut Coro = unsafe { &mut *(coro_ptr as *mut Coro) };

    let mut body = coro
        .body
        .take()
        .expect("coro entry trampoline invoked with no body installed");
    let result = body(coro);
    coro.ended = true;

    // A coroutine's machine-level function must never return: once the
    // body finishes, keep yielding the final result back to whatever
    // resumes it, forever. `Coro::resume` short-circuits on `self.ended`
    // before this loop is ever reached again in practice.
    loop {
        coro.yield_value(result);
    }
}

impl Coro {
    /// Build a new coroutine with its own guard-paged stack (floored at
    /// [`stack::min_stack_size`]) and the given body. `f` receives the
    /// `Coro` itself so it can call `yield_value`, `defer`/`defer2`, or
    /// the `coro_*` allocation helpers.
    ///
    /// Returns `None` if the stack could not be mapped.
    pub fn new<F>(stack_size: usize, f: F) -> Option<Box<Coro>>
    where
        F: FnMut(&mut Coro) -> i32 + 'static,
    {
        let size = stack::min_stack_size().max(stack_size);
        let stack = CoroStack::new(size)?;

        let mut boxed = Box::new(Coro {
            stack,
            context: MachineContext::new(),
            defers: DeferredStack::new(),
            body: Some(Box::new(f)),
            ended: false,
            switcher: ptr::null_mut(),
            pending_value: 0,
        });

        let coro_ptr = boxed.as_mut() as *mut Coro as *mut u8;
        boxed
            .context
            .init_entry(&boxed.stack, entry_trampoline as EntryFn, coro_ptr);

        Some(boxed)
    }

    /// Reuse this coroutine's stack for a new body, as a pool would when
    /// handing a finished connection slot to a fresh one. Any deferred
    /// actions still outstanding from the previous run are unwound first.
    pub fn reset<F>(&mut self, f: F)
    where
        F: FnMut(&mut Coro) -> i32 + 'static,
    {
        self.defers.run_from(0);
        self.ended = false;
        self.pending_value = 0;
        self.body = Some(Box::new(f));

        let coro_ptr = self as *mut Coro as *mut u8;
        self.context
            .init_entry(&self.stack, entry_trampoline as EntryFn, coro_ptr);
    }

    /// Transfer control into the coroutine until it next yields or
    /// finishes, returning whatever code it yielded (or its final
    /// result, every time, once it has finished).
    ///
    /// `yield_value` never swaps directly into `self.context`: it saves
    /// the coroutine's suspended state into `switcher.callee` instead, so
    /// this copies it into `self.context` afterwards (skipped once the
    /// coroutine has ended, since there is nothing left to resume into).
    /// On non-x86_64 targets, `switcher.caller` is saved and restored
    /// around the swap too, since the `ucontext` swap there does not give
    /// this crate the in-place caller rewrite the hand-written x86_64 asm
    /// routine exploits.
    pub fn resume(&mut self, switcher: &mut Switcher) -> i32 {
        if self.ended {
            return self.pending_value;
        }

        self.switcher = switcher as *mut Switcher;

        #[cfg(not(target_arch = "x86_64"))]
        let mut prev_caller = MachineContext::new();
        #[cfg(not(target_arch = "x86_64"))]
        prev_caller.copy_from(&switcher.caller);

        MachineContext::swap(&mut switcher.caller, &mut self.context);

        if !self.ended {
            self.context.copy_from(&switcher.callee);
            #[cfg(not(target_arch = "x86_64"))]
            switcher.caller.copy_from(&prev_caller);
        }

        self.pending_value
    }

    /// As `resume`, but first deliver `value` as the return of the
    /// `yield_value` call the coroutine is currently suspended in.
    pub fn resume_value(&mut self, switcher: &mut Switcher, value: i32) -> i32 {
        self.pending_value = value;
        self.resume(switcher)
    }

    /// Suspend the currently-running coroutine, handing `value` back to
    /// whichever `resume`/`resume_value` call is waiting for it. Returns
    /// the value the next `resume_value` delivers.
    ///
    /// Must only be called from within the coroutine's own body (or code
    /// it calls into); calling it from the resuming thread is undefined.
    pub fn yield_value(&mut self, value: i32) -> i32 {
        self.pending_value = value;
        debug_assert!(!self.switcher.is_null(), "yield outside of a resume");
        let switcher = unsafe { &mut *self.switcher };
        MachineContext::swap(&mut switcher.callee, &mut switcher.caller);
        self.pending_value
    }

    /// Whether the coroutine's body has run to completion.
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Register a cleanup action to run the next time the deferred stack
    /// unwinds past the current generation.
    pub fn defer(&mut self, action: DeferredAction) {
        self.defers.push(action);
    }

    /// Convenience wrapper over `defer` for a plain closure.
    pub fn defer2<F>(&mut self, f: F)
    where
        F: FnOnce() + 'static,
    {
        self.defer(DeferredAction::new(f));
    }

    /// Current deferred-stack depth, usable as a later `deferred_run`
    /// bookmark.
    pub fn deferred_generation(&self) -> usize {
        self.defers.generation()
    }

    /// Unwind every deferred action registered after `generation`, most
    /// recently registered first.
    pub fn deferred_run(&mut self, generation: usize) {
        self.defers.run_from(generation);
    }

    /// Consume the coroutine: run every remaining deferred action (LIFO)
    /// before the stack is released.
    pub fn free(mut self) {
        self.defers.run_from(0);
    }
}

impl Drop for Coro {
    fn drop(&mut self) {
        // Defensive: `free` already does this, but a `Coro` dropped
        // without an explicit `free` call (e.g. a pooled slot simply
        // going out of scope) must still unwind outstanding defers.
        self.defers.run_from(0);
    }
}

// A `Coro` migrates between worker threads only while fully suspended
// (never mid-resume); nothing here is touched concurrently.
unsafe impl Send for Coro {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_to_completion_and_keeps_returning_its_result() {
        let mut switcher = Switcher::new();
        let mut coro = Coro::new(32 * 1024, |_coro: &mut Coro| 42).unwrap();

        assert!(!coro.ended());
        let first = coro.resume(&mut switcher);
        assert_eq!(first, 42);
        assert!(coro.ended());

        // Resuming a finished coroutine keeps returning the same result.
        let second = coro.resume(&mut switcher);
        assert_eq!(second, 42);
    }

    #[test]
    fn yield_value_suspends_and_resume_value_delivers_the_reply() {
        let mut switcher = Switcher::new();
        let mut coro = Coro::new(32 * 1024, |coro: &mut Coro| {
            let reply = coro.yield_value(1);
            reply + 100
        })
        .unwrap();

        let yielded = coro.resume(&mut switcher);
        assert_eq!(yielded, 1);
        assert!(!coro.ended());

        let finished = coro.resume_value(&mut switcher, 7);
        assert_eq!(finished, 107);
        assert!(coro.ended());
    }

    #[test]
    fn defers_run_in_lifo_order_once_the_body_completes() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let order = Rc::new(RefCell::new(Vec::new()));
        let mut switcher = Switcher::new();

        let o1 = order.clone();
        let o2 = order.clone();
        let mut coro = Coro::new(32 * 1024, move |coro: &mut Coro| {
            let o1 = o1.clone();
            coro.defer2(move || o1.borrow_mut().push(1));
            let o2 = o2.clone();
            coro.defer2(move || o2.borrow_mut().push(2));
            0
        })
        .unwrap();

        coro.resume(&mut switcher);
        assert!(coro.ended());
        assert!(order.borrow().is_empty());

        coro.deferred_run(0);
        assert_eq!(*order.borrow(), vec![2, 1]);
    }

    #[test]
    fn reset_reuses_the_stack_for_a_new_body() {
        let mut switcher = Switcher::new();
        let mut coro = Coro::new(32 * 1024, |_: &mut Coro| 1).unwrap();
        assert_eq!(coro.resume(&mut switcher), 1);

        coro.reset(|_: &mut Coro| 2);
        assert!(!coro.ended());
        assert_eq!(coro.resume(&mut switcher), 2);
    }

    #[test]
    fn free_runs_all_remaining_defers_in_lifo_order() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let order = Rc::new(RefCell::new(Vec::new()));
        let mut switcher = Switcher::new();

        let o1 = order.clone();
        let o2 = order.clone();
        let o3 = order.clone();
        let mut coro = Coro::new(32 * 1024, move |coro: &mut Coro| {
            let o1 = o1.clone();
            coro.defer2(move || o1.borrow_mut().push(1));
            let o2 = o2.clone();
            coro.defer2(move || o2.borrow_mut().push(2));
            let o3 = o3.clone();
            coro.defer2(move || o3.borrow_mut().push(3));
            0
        })
        .unwrap();

        coro.resume(&mut switcher);
        assert!(order.borrow().is_empty());

        coro.free();
        assert_eq!(*order.borrow(), vec![3, 2, 1]);
    }

    #[test]
    fn deferred_generation_bookmarks_a_later_unwind_point() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let order = Rc::new(RefCell::new(Vec::new()));
        let mut switcher = Switcher::new();

        let o1 = order.clone();
        let o2 = order.clone();
        let mut coro = Coro::new(32 * 1024, move |coro: &mut Coro| {
            let o1 = o1.clone();
            coro.defer2(move || o1.borrow_mut().push("outer"));
            let checkpoint = coro.deferred_generation();
            let o2 = o2.clone();
            coro.defer2(move || o2.borrow_mut().push("inner"));
            coro.deferred_run(checkpoint);
            0
        })
        .unwrap();

        coro.resume(&mut switcher);
        assert_eq!(*order.borrow(), vec!["inner"]);

        coro.deferred_run(0);
        assert_eq!(*order.borrow(), vec!["inner", "outer"]);
    }
}
