//! Runs hook and command callbacks with panic containment.
//!
//! A failure comes back together with a stack trace. For panics the trace is
//! taken inside the panic hook, so it shows the frames of the callback that
//! panicked rather than the dispatcher's.

use crate::error::panic_message;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

thread_local! {
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
    static PANIC_TRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Panics raised inside [`run_guarded`] are recorded for the caller instead
/// of being printed; any other panic goes to the previously installed hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARD_DEPTH.with(Cell::get) > 0 {
                PANIC_TRACE.with(|trace| *trace.borrow_mut() = Some(Backtrace::force_capture()));
            } else {
                previous(info);
            }
        }));
    });
}

/// A failed callback and where it failed.
#[derive(Debug)]
pub(crate) struct Failure<E> {
    pub error: E,
    pub trace: Backtrace,
}

/// Runs `callback`, turning a panic into the error built by `panicked`.
pub(crate) fn run_guarded<E, F, P>(callback: F, panicked: P) -> Result<(), Failure<E>>
where
    F: FnOnce() -> Result<(), E>,
    P: FnOnce(String) -> E,
{
    install_panic_hook();

    GUARD_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(callback));
    GUARD_DEPTH.with(|depth| depth.set(depth.get() - 1));

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(Failure {
            error,
            trace: Backtrace::force_capture(),
        }),
        Err(payload) => {
            let trace = PANIC_TRACE
                .with(|trace| trace.borrow_mut().take())
                .unwrap_or_else(Backtrace::force_capture);
            Err(Failure {
                error: panicked(panic_message(payload.as_ref())),
                trace,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline(never)]
    fn exploding_callback() -> Result<(), String> {
        panic!("kaboom")
    }

    #[test]
    fn success_passes_through() {
        assert!(run_guarded(|| Ok::<(), String>(()), |msg| msg).is_ok());
    }

    #[test]
    fn returned_error_carries_a_captured_trace() {
        let failure = run_guarded(|| Err("nope".to_string()), |msg| msg).unwrap_err();
        assert_eq!(failure.error, "nope");
        assert_eq!(
            failure.trace.status(),
            std::backtrace::BacktraceStatus::Captured
        );
    }

    #[test]
    fn panic_is_contained_with_its_message() {
        let failure = run_guarded(exploding_callback, |msg| format!("panicked: {msg}")).unwrap_err();
        assert_eq!(failure.error, "panicked: kaboom");
        assert_eq!(
            failure.trace.status(),
            std::backtrace::BacktraceStatus::Captured
        );
        GUARD_DEPTH.with(|depth| assert_eq!(depth.get(), 0));
    }
}
