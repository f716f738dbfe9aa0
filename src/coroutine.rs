use std::fmt;

use crate::{Error, Step, Suspendable};

/// A suspendable computation built from continuations
///
/// Nothing runs when a coroutine is built. Code only runs when a driver
/// calls [step](Suspendable::step), and it runs until the next
/// suspension point (a [sleep]) or until the coroutine finishes.
///
/// This is represented as a monad <https://en.wikipedia.org/wiki/Monad_(functional_programming)>,
/// so larger computations are made by chaining smaller ones with [bind].
/// Errors short-circuit the chain, like `?` does for `Result`.
pub struct Coroutine<'a, T, E> {
    state: CoroutineState<'a, T, E>,
}

/// The internal state of the machine
enum CoroutineState<'a, T: 'a, E: 'a> {
    /// Code that has not run yet, it runs on the next step
    Deferred(Box<dyn FnOnce() -> Coroutine<'a, T, E> + 'a>),
    /// Paused at a suspension point, the box holds what runs after it
    Suspend(Box<Coroutine<'a, T, E>>),
    /// Finished, but the driver has not collected the outcome yet
    Done(Result<T, E>),
    /// Terminated by cancel
    Cancelled,
    /// The outcome was handed to the driver
    Spent,
}

/// Return/unit. Creates a coroutine that completes with the supplied value
///
/// This lifts the value into the coroutine 'world'
/// ```
/// use costep::*;
/// let mut co: Coroutine<i32, ()> = result(1);
/// assert_eq!(co.step(), Step::Completed(1));
/// ```
pub fn result<'a, T, E>(value: T) -> Coroutine<'a, T, E> {
    let state = CoroutineState::Done(Ok(value));
    Coroutine { state }
}

/// Creates a coroutine that fails with the supplied error
/// ```
/// use costep::*;
/// let mut co: Coroutine<i32, &str> = fail("nope");
/// assert_eq!(co.step(), Step::Failed(Error::Failed("nope")));
/// ```
pub fn fail<'a, T, E>(error: E) -> Coroutine<'a, T, E> {
    let state = CoroutineState::Done(Err(error));
    Coroutine { state }
}

/// Creates a coroutine that finishes with the supplied result
pub fn from_result<'a, T, E>(outcome: Result<T, E>) -> Coroutine<'a, T, E> {
    let state = CoroutineState::Done(outcome);
    Coroutine { state }
}

/// Delays running `f` until the coroutine is first stepped
///
/// Use this wherever a coroutine does work with side effects, so the work
/// happens when a driver gets to it and not when the coroutine is built.
/// ```
/// use costep::*;
/// use std::cell::Cell;
///
/// let ran = Cell::new(false);
/// let mut co: Coroutine<(), ()> = defer(|| {
///     ran.set(true);
///     result(())
/// });
/// assert!(!ran.get());
/// assert_eq!(co.step(), Step::Completed(()));
/// assert!(ran.get());
/// ```
pub fn defer<'a, T, E, F>(f: F) -> Coroutine<'a, T, E>
where
    F: FnOnce() -> Coroutine<'a, T, E> + 'a,
{
    let state = CoroutineState::Deferred(Box::new(f));
    Coroutine { state }
}

/// Suspends the current chain of coroutines once
///
/// This is the only place where control is handed back to a driver.
/// The first step returns `Suspended`, the second `Completed(())`.
/// ```
/// use costep::*;
/// let mut co: Coroutine<(), ()> = sleep();
/// assert_eq!(co.step(), Step::Suspended);
/// assert_eq!(co.step(), Step::Completed(()));
/// ```
pub fn sleep<'a, E>() -> Coroutine<'a, (), E> {
    let state = CoroutineState::Suspend(Box::new(result(())));
    Coroutine { state }
}

/// Chain coroutines together.
///
/// This allows the value from one coroutine to flow into the next one.
/// `f` only runs once `m` completes, during a step; if `m` fails or is
/// cancelled `f` never runs.
/// This is equivalent to and_then for the Result type.
/// ```
/// use costep::*;
/// // suspends once, then adds one to the value
/// let mut co: Coroutine<i32, ()> = bind(awaitable(1), |a| result(a + 1));
/// assert_eq!(co.step(), Step::Suspended);
/// assert_eq!(co.step(), Step::Completed(2));
/// ```
pub fn bind<'a, T, U, E, F>(m: Coroutine<'a, T, E>, f: F) -> Coroutine<'a, U, E>
where
    F: FnOnce(T) -> Coroutine<'a, U, E> + 'a,
    T: 'a,
    U: 'a,
    E: 'a,
{
    let state = match m.state {
        CoroutineState::Deferred(segment) => {
            CoroutineState::Deferred(Box::new(move || bind(segment(), f)))
        }
        CoroutineState::Suspend(next) => CoroutineState::Suspend(Box::new(bind(*next, f))),
        CoroutineState::Done(Ok(value)) => CoroutineState::Deferred(Box::new(move || f(value))),
        CoroutineState::Done(Err(error)) => CoroutineState::Done(Err(error)),
        CoroutineState::Cancelled => CoroutineState::Cancelled,
        CoroutineState::Spent => CoroutineState::Spent,
    };
    Coroutine { state }
}

/// Chain a recovery step onto a failure
///
/// The mirror of [bind]: `f` runs only if `m` fails, and may resume with a
/// value or fail with a different error.
/// Cancellation is not a failure of the coroutine and skips `f`.
pub fn bind_err<'a, T, E, E2, F>(m: Coroutine<'a, T, E>, f: F) -> Coroutine<'a, T, E2>
where
    F: FnOnce(E) -> Coroutine<'a, T, E2> + 'a,
    T: 'a,
    E: 'a,
    E2: 'a,
{
    let state = match m.state {
        CoroutineState::Deferred(segment) => {
            CoroutineState::Deferred(Box::new(move || bind_err(segment(), f)))
        }
        CoroutineState::Suspend(next) => CoroutineState::Suspend(Box::new(bind_err(*next, f))),
        CoroutineState::Done(Ok(value)) => CoroutineState::Done(Ok(value)),
        CoroutineState::Done(Err(error)) => CoroutineState::Deferred(Box::new(move || f(error))),
        CoroutineState::Cancelled => CoroutineState::Cancelled,
        CoroutineState::Spent => CoroutineState::Spent,
    };
    Coroutine { state }
}

impl<'a, T, E> Suspendable for Coroutine<'a, T, E> {
    type Output = T;
    type Error = E;

    fn step(&mut self) -> Step<T, Error<E>> {
        loop {
            match std::mem::replace(&mut self.state, CoroutineState::Spent) {
                CoroutineState::Deferred(segment) => *self = segment(),
                CoroutineState::Suspend(next) => {
                    *self = *next;
                    return Step::Suspended;
                }
                CoroutineState::Done(Ok(value)) => return Step::Completed(value),
                CoroutineState::Done(Err(error)) => return Step::Failed(Error::Failed(error)),
                CoroutineState::Cancelled => {
                    self.state = CoroutineState::Cancelled;
                    return Step::Failed(Error::Cancelled);
                }
                CoroutineState::Spent => panic!("coroutine stepped after it finished"),
            }
        }
    }

    fn cancel(&mut self) {
        if !self.is_finished() {
            // dropping the continuation releases everything it captured
            self.state = CoroutineState::Cancelled;
        }
    }

    fn is_finished(&self) -> bool {
        matches!(
            self.state,
            CoroutineState::Cancelled | CoroutineState::Spent
        )
    }
}

impl<'a, T, E> fmt::Debug for Coroutine<'a, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            CoroutineState::Deferred(_) => "Deferred",
            CoroutineState::Suspend(_) => "Suspend",
            CoroutineState::Done(_) => "Done",
            CoroutineState::Cancelled => "Cancelled",
            CoroutineState::Spent => "Spent",
        };
        f.debug_struct("Coroutine").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Co<T> = Coroutine<'static, T, &'static str>;

    #[test]
    fn sleep_suspends_exactly_once() {
        let mut co: Co<()> = sleep();
        assert_eq!(co.step(), Step::Suspended);
        assert!(!co.is_finished());
        assert_eq!(co.step(), Step::Completed(()));
        assert!(co.is_finished());
    }

    #[test]
    #[should_panic(expected = "stepped after it finished")]
    fn sleep_stepped_a_third_time_panics() {
        let mut co: Co<()> = sleep();
        let _ = co.step();
        let _ = co.step();
        let _ = co.step();
    }

    #[test]
    fn sleep_inside_a_chain_suspends_the_chain() {
        let mut co: Co<&str> = bind(sleep(), |()| result("finished"));
        assert_eq!(co.step(), Step::Suspended);
        assert_eq!(co.step(), Step::Completed("finished"));
    }

    #[test]
    fn bind_does_not_run_code_at_construction() {
        let log = Rc::new(RefCell::new(vec![]));
        let inner = log.clone();
        let mut co: Co<()> = bind(result(()), move |()| {
            inner.borrow_mut().push("ran");
            result(())
        });

        assert!(log.borrow().is_empty());
        assert_eq!(co.step(), Step::Completed(()));
        assert_eq!(*log.borrow(), vec!["ran"]);
    }

    #[test]
    fn failure_short_circuits_bind() {
        let mut co: Co<i32> = bind(fail("early"), |()| result(1));
        assert_eq!(co.step(), Step::Failed(Error::Failed("early")));
    }

    #[test]
    fn failure_after_suspension_is_reported_on_the_later_step() {
        let mut co: Co<i32> = bind(sleep(), |()| fail("late"));
        assert_eq!(co.step(), Step::Suspended);
        assert_eq!(co.step(), Step::Failed(Error::Failed("late")));
    }

    #[test]
    fn bind_err_recovers_from_failure() {
        let failing: Co<i32> = bind(sleep(), |()| fail("late"));
        let mut co: Coroutine<i32, ()> = bind_err(failing, |_| result(7));
        assert_eq!(co.step(), Step::Suspended);
        assert_eq!(co.step(), Step::Completed(7));
    }

    #[test]
    fn cancel_is_sticky_and_drops_the_continuation() {
        let resource = Rc::new(());
        let held = resource.clone();
        let mut co: Co<usize> = bind(sleep(), move |()| result(Rc::strong_count(&held)));

        assert_eq!(co.step(), Step::Suspended);
        assert_eq!(Rc::strong_count(&resource), 2);
        co.cancel();
        assert_eq!(Rc::strong_count(&resource), 1);
        assert!(co.is_finished());
        assert_eq!(co.step(), Step::Failed(Error::Cancelled));
        assert_eq!(co.step(), Step::Failed(Error::Cancelled));
    }

    #[test]
    fn cancel_on_a_finished_coroutine_is_a_no_op() {
        let mut co: Co<i32> = result(1);
        assert_eq!(co.step(), Step::Completed(1));
        co.cancel();
        assert!(co.is_finished());
    }

    #[test]
    fn cancel_before_first_step_never_runs_the_body() {
        let log = Rc::new(RefCell::new(vec![]));
        let inner = log.clone();
        let mut co: Co<()> = defer(move || {
            inner.borrow_mut().push("ran");
            result(())
        });

        co.cancel();
        assert_eq!(co.step(), Step::Failed(Error::Cancelled));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn debug_shows_the_state() {
        let co: Co<()> = sleep();
        assert_eq!(format!("{:?}", co), "Coroutine { state: \"Suspend\" }");
    }
}
