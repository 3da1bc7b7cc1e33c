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

//! The raw machine-context swap.
//!
//! On `x86_64` this is a hand-written save/restore of the callee-preserved
//! integer registers plus the stack and instruction pointer -- ported
//! directly from the reference `coro_swapcontext` routine. It deliberately
//! does *not* save floating-point/SSE state or the signal mask: coroutine
//! code must not assume FP/SSE register values survive a `yield`/`resume`.
//!
//! On every other architecture the crate falls back to POSIX `ucontext`
//! (`getcontext`/`makecontext`/`swapcontext`), which is slower but saves a
//! strictly larger state superset and needs no per-arch assembly.

#[allow(unused_imports)]
use std::mem;
#[allow(unused_imports)]
use std::ptr;

use super::stack::CoroStack;

/// Opaque function the coroutine starts executing the first time it is
/// resumed. Receives the coroutine's own address; never returns.
pub type EntryFn = extern "C" fn(coro: *mut u8) -> !;

#[cfg(target_arch = "x86_64")]
mod arch {
    use super::*;

    // Field order matters: it must match the byte offsets the assembly
    // routine below reads/writes (0, 8, 16, ... 72).
    #[repr(C)]
    #[derive(Default, Clone, Copy)]
    pub struct MachineContext {
        rbx: usize,
        rbp: usize,
        r12: usize,
        r13: usize,
        r14: usize,
        r15: usize,
        rdi: usize,
        rsi: usize,
        rip: usize,
        rsp: usize,
    }

    extern "C" {
        /// Save the currently-executing register state into `cur`, then
        /// load and jump into the state previously saved in `other`.
        ///
        /// Noinline by construction (it's a bare assembly routine, not
        /// something LLVM can see into).
        fn corowire_swap_context(cur: *mut MachineContext, other: *mut MachineContext);
    }

    std::arch::global_asm!(
        ".att_syntax",
        ".text",
        ".p2align 4",
        ".globl corowire_swap_context",
        "corowire_swap_context:",
        "mov    %rbx,0(%rdi)",
        "mov    %rbp,8(%rdi)",
        "mov    %r12,16(%rdi)",
        "mov    %r13,24(%rdi)",
        "mov    %r14,32(%rdi)",
        "mov    %r15,40(%rdi)",
        "mov    %rdi,48(%rdi)",
        "mov    %rsi,56(%rdi)",
        "mov    (%rsp),%rcx",
        "mov    %rcx,64(%rdi)",
        "lea    0x8(%rsp),%rcx",
        "mov    %rcx,72(%rdi)",
        "mov    72(%rsi),%rsp",
        "mov    0(%rsi),%rbx",
        "mov    8(%rsi),%rbp",
        "mov    16(%rsi),%r12",
        "mov    24(%rsi),%r13",
        "mov    32(%rsi),%r14",
        "mov    40(%rsi),%r15",
        "mov    48(%rsi),%rdi",
        "mov    64(%rsi),%rcx",
        "mov    56(%rsi),%rsi",
        "jmp    *%rcx",
    );

    impl MachineContext {
        pub fn new() -> MachineContext {
            MachineContext::default()
        }

        /// Arm this context so that the next swap-in begins executing
        /// `entry(coro)` at the top of `stack`.
        ///
        /// Only `rdi` (first SysV argument register), `rip`, and `rsp` need
        /// setting: the trampoline is an ordinary `extern "C" fn(*mut u8)`,
        /// so the usual C calling convention delivers `coro` for us. The
        /// original C runtime used three registers here (coro, function,
        /// data) because its entry point was itself hand-written assembly
        /// shuffling three arguments into a two-argument call; this port's
        /// trampoline needs only the coroutine pointer; it recovers the
        /// user closure from the `Coro` itself.
        pub fn init_entry(&mut self, stack: &CoroStack, entry: EntryFn, coro: *mut u8) {
            // SAFETY note for callers: `entry` must never return.
            let top = stack.top() as usize;
            // Align to 16 bytes, then back off 8: this is what a `call`
            // instruction's automatic return-address push would have left,
            // which is the alignment `jmp`-as-a-call needs on entry.
            let rsp = (top & !0xf) - 0x8;

            *self = MachineContext {
                rdi: coro as usize,
                rip: entry as usize,
                rsp,
                ..MachineContext::default()
            };
        }

        pub fn swap(cur: &mut MachineContext, other: &mut MachineContext) {
            unsafe { corowire_swap_context(cur as *mut _, other as *mut _) }
        }

        /// Overwrite `self` with a copy of `other`'s saved register state.
        pub fn copy_from(&mut self, other: &MachineContext) {
            *self = *other;
        }
    }
}

#[cfg(not(target_arch = "x86_64"))]
mod arch {
    use super::*;

    pub struct MachineContext {
        inner: Box<libc::ucontext_t>,
    }

    // `makecontext`'s varargs can only portably carry `int`s, so both the
    // entry function pointer and the coroutine pointer are split into
    // two `u32` halves each and reassembled by `trampoline` below -- the
    // standard trick for this API. Passing both pointers as arguments
    // (rather than stashing either in shared/thread-local state) keeps
    // multiple not-yet-resumed coroutines from clobbering each other.
    extern "C" fn trampoline(entry_hi: u32, entry_lo: u32, coro_hi: u32, coro_lo: u32) {
        let entry_bits = ((entry_hi as u64) << 32) | entry_lo as u64;
        let coro_bits = ((coro_hi as u64) << 32) | coro_lo as u64;
        let entry: EntryFn = unsafe { mem::transmute::<usize, EntryFn>(entry_bits as usize) };
        let coro = coro_bits as usize as *mut u8;
        entry(coro);
    }

    impl MachineContext {
        pub fn new() -> MachineContext {
            MachineContext {
                inner: Box::new(unsafe { mem::zeroed() }),
            }
        }

        pub fn init_entry(&mut self, stack: &CoroStack, entry: EntryFn, coro: *mut u8) {
            unsafe {
                libc::getcontext(self.inner.as_mut());
            }
            self.inner.uc_stack.ss_sp = stack.start() as *mut libc::c_void;
            self.inner.uc_stack.ss_size = stack.top() as usize - stack.start() as usize;
            self.inner.uc_stack.ss_flags = 0;
            self.inner.uc_link = ptr::null_mut();

            let entry_bits = entry as usize as u64;
            let coro_bits = coro as usize as u64;
            let entry_hi = (entry_bits >> 32) as u32;
            let entry_lo = (entry_bits & 0xffff_ffff) as u32;
            let coro_hi = (coro_bits >> 32) as u32;
            let coro_lo = (coro_bits & 0xffff_ffff) as u32;

            unsafe {
                let func: extern "C" fn() =
                    mem::transmute(trampoline as extern "C" fn(u32, u32, u32, u32));
                libc::makecontext(self.inner.as_mut(), func, 4, entry_hi, entry_lo, coro_hi, coro_lo);
            }
        }

        /// Unlike the x86_64 asm path, `ucontext`'s `swapcontext` does not
        /// let the caller rewrite its own saved state in place after the
        /// fact, so a resume that doesn't end the coroutine must restore
        /// the caller's prior context explicitly.
        pub fn swap(cur: &mut MachineContext, other: &mut MachineContext) {
            unsafe {
                libc::swapcontext(cur.inner.as_mut(), other.inner.as_ref());
            }
        }

        /// Overwrite `self` with a copy of `other`'s saved register state.
        pub fn copy_from(&mut self, other: &MachineContext) {
            unsafe {
                ptr::copy_nonoverlapping(other.inner.as_ref(), self.inner.as_mut(), 1);
            }
        }
    }
}

pub use arch::MachineContext;
