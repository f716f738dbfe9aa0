//! The root driver
//!
//! [run] is the outermost layer: it steps a computation until it is done and
//! hides every suspension from its caller. Anything that needs to keep
//! suspending, like a gather, steps its children itself instead.

use tracing::{debug, trace};

use crate::{Error, Step, Suspendable};

/// Runs a computation to completion and returns its result
///
/// Blocks the calling thread until the computation completes or fails.
/// Success and failure come back exactly as the computation produced them.
/// Pass `&mut computation` to keep hold of it afterwards.
/// ```
/// use costep::*;
/// use costep::executor::run;
///
/// let co: Coroutine<&str, ()> = bind(sleep(), |()| result("done"));
/// assert_eq!(run(co), Ok("done"));
/// ```
pub fn run<S: Suspendable>(mut computation: S) -> Result<S::Output, Error<S::Error>> {
    let mut suspensions = 0usize;
    loop {
        match computation.step() {
            Step::Suspended => suspensions += 1,
            Step::Completed(value) => {
                trace!(suspensions, "computation completed");
                return Ok(value);
            }
            Step::Failed(error) => {
                debug!(suspensions, cancelled = error.is_cancelled(), "computation failed");
                return Err(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{awaitable, bind, fail, result, sleep, Coroutine};
    use std::cell::Cell;
    use std::rc::Rc;

    type Co<T> = Coroutine<'static, T, &'static str>;

    /// Counts the steps taken by whatever it wraps
    struct Counted<S> {
        inner: S,
        steps: Rc<Cell<usize>>,
    }

    impl<S: Suspendable> Suspendable for Counted<S> {
        type Output = S::Output;
        type Error = S::Error;

        fn step(&mut self) -> Step<S::Output, Error<S::Error>> {
            self.steps.set(self.steps.get() + 1);
            self.inner.step()
        }

        fn cancel(&mut self) {
            self.inner.cancel()
        }

        fn is_finished(&self) -> bool {
            self.inner.is_finished()
        }
    }

    fn suspending(times: usize, value: i32) -> Co<i32> {
        if times == 0 {
            return result(value);
        }
        bind(sleep(), move |()| suspending(times - 1, value))
    }

    #[test]
    fn instantly_completes() {
        let co: Co<i32> = result(1);
        assert_eq!(run(co), Ok(1));
    }

    #[test]
    fn runs_through_suspensions() {
        let co: Co<&str> = bind(sleep(), |()| result("done"));
        assert_eq!(run(co), Ok("done"));
    }

    #[test]
    fn takes_one_step_per_suspension_beyond_the_first() {
        for m in 0..5 {
            let steps = Rc::new(Cell::new(0));
            let co = Counted {
                inner: suspending(m, 42),
                steps: steps.clone(),
            };
            assert_eq!(run(co), Ok(42));
            assert_eq!(steps.get(), m + 1);
        }
    }

    #[test]
    fn propagates_failure_unchanged() {
        let co: Co<i32> = bind(awaitable(()), |()| fail("broken"));
        assert_eq!(run(co), Err(Error::Failed("broken")));
    }

    #[test]
    fn reports_cancellation() {
        let mut co: Co<i32> = awaitable(1);
        co.cancel();
        assert_eq!(run(&mut co), Err(Error::Cancelled));
    }
}
