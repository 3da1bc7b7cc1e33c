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

//! The deferred-action stack backing `defer`/`deferred_run`: the explicit
//! form of scope-based cleanup with guaranteed release on every exit
//! path, including host-driven cancellation.

/// One registered cleanup action. The C original stores `(fn, data1,
/// data2)` triples; a Rust closure already carries its captured data, so
/// this is simply a boxed `FnOnce`.
pub struct DeferredAction(Box<dyn FnOnce()>);

impl DeferredAction {
    pub fn new(f: impl FnOnce() + 'static) -> DeferredAction {
        DeferredAction(Box::new(f))
    }

    fn run(self) {
        (self.0)()
    }
}

/// The ordered sequence of deferred actions for one `Coro`, in
/// registration order; `run_from` invokes a suffix in strict LIFO order.
#[derive(Default)]
pub struct DeferredStack {
    actions: Vec<DeferredAction>,
}

impl DeferredStack {
    pub fn new() -> DeferredStack {
        DeferredStack {
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, action: DeferredAction) {
        self.actions.push(action);
    }

    /// Current depth: a bookmark a later `run_from` can unwind back to.
    pub fn generation(&self) -> usize {
        self.actions.len()
    }

    /// Invoke and pop every action registered after `generation`, in
    /// reverse (LIFO) order, leaving `generation() == generation`.
    ///
    /// Actions `d1..dk` registered after the bookmark run as
    /// `dk, dk-1, ..., d1`.
    pub fn run_from(&mut self, generation: usize) {
        debug_assert!(generation <= self.actions.len());
        while self.actions.len() > generation {
            if let Some(action) = self.actions.pop() {
                action.run();
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn runs_lifo_from_a_generation() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut defers = DeferredStack::new();

        let gen = defers.generation();
        assert_eq!(gen, 0);

        for n in 1..=3 {
            let order = order.clone();
            defers.push(DeferredAction::new(move || order.borrow_mut().push(n)));
        }

        defers.run_from(gen);

        assert_eq!(*order.borrow(), vec![3, 2, 1]);
        assert_eq!(defers.generation(), 0);
    }

    #[test]
    fn run_from_only_unwinds_the_requested_suffix() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut defers = DeferredStack::new();

        {
            let order = order.clone();
            defers.push(DeferredAction::new(move || order.borrow_mut().push("outer")));
        }
        let checkpoint = defers.generation();
        {
            let order = order.clone();
            defers.push(DeferredAction::new(move || order.borrow_mut().push("inner")));
        }

        defers.run_from(checkpoint);
        assert_eq!(*order.borrow(), vec!["inner"]);
        assert_eq!(defers.generation(), checkpoint);

        defers.run_from(0);
        assert_eq!(*order.borrow(), vec!["inner", "outer"]);
    }
}
