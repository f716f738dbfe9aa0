//! Bridging to native `async` code
//!
//! A [Task] lets an `async` block take part as a suspendable computation:
//! every step polls the future once, and `Pending` counts as a suspension.
//! Inside the block, [yield_now] plays the part of [sleep](crate::sleep).
//!
//! Going the other way, [Awaiting] turns any suspendable computation,
//! a gather for instance, into a future so an `async` block can await it.
//! ```
//! use costep::*;
//! use costep::task::{task, yield_now};
//! use costep::executor::run;
//! use std::convert::Infallible;
//!
//! let co = task(async {
//!     yield_now().await;
//!     Ok::<_, Infallible>("finished")
//! });
//! assert_eq!(run(co), Ok("finished"));
//! ```
//!
//! When the block hands back the outcome of other computations, build it with
//! [try_task] so their errors reach the driver unchanged.
//! ```
//! use costep::*;
//! use costep::task::try_task;
//! use costep::gather::gather;
//! use costep::executor::run;
//!
//! let co = try_task(async {
//!     let failing: Coroutine<i32, &str> = bind(sleep(), |()| fail("boom"));
//!     gather(vec![failing]).awaiting().await
//! });
//! assert_eq!(run(co), Err(Error::Failed("boom")));
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

use crate::{Error, Step, Suspendable};

type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, Error<E>>> + 'a>>;

/// A future driven as a suspendable computation
pub struct Task<'a, T, E> {
    state: TaskState<'a, T, E>,
}

enum TaskState<'a, T, E> {
    Running(BoxFuture<'a, T, E>),
    Cancelled,
    Spent,
}

/// Wraps a future so it can be stepped like any other computation
///
/// The future is polled with a waker that does nothing, so it must only
/// wait on things that make progress when polled again, like [yield_now].
/// A future waiting on real I/O or timers would never finish.
pub fn task<'a, F, T, E>(future: F) -> Task<'a, T, E>
where
    F: Future<Output = Result<T, E>> + 'a,
    T: 'a,
    E: 'a,
{
    try_task(async move { future.await.map_err(Error::Failed) })
}

/// Like [task], for a future that already reports this crate's [Error]
///
/// The error is passed on as it is, so a failure or cancellation of a
/// computation awaited inside the future reaches the driver unchanged.
pub fn try_task<'a, F, T, E>(future: F) -> Task<'a, T, E>
where
    F: Future<Output = Result<T, Error<E>>> + 'a,
{
    Task {
        state: TaskState::Running(Box::pin(future)),
    }
}

impl<'a, T, E> Suspendable for Task<'a, T, E> {
    type Output = T;
    type Error = E;

    fn step(&mut self) -> Step<T, Error<E>> {
        let future = match &mut self.state {
            TaskState::Running(future) => future,
            TaskState::Cancelled => return Step::Failed(Error::Cancelled),
            TaskState::Spent => panic!("task stepped after it finished"),
        };
        let mut cx = Context::from_waker(Waker::noop());
        let outcome = match future.as_mut().poll(&mut cx) {
            Poll::Pending => return Step::Suspended,
            Poll::Ready(outcome) => outcome,
        };
        self.state = TaskState::Spent;
        match outcome {
            Ok(value) => Step::Completed(value),
            Err(error) => Step::Failed(error),
        }
    }

    fn cancel(&mut self) {
        if let TaskState::Running(_) = self.state {
            // drops the future, running its destructors
            self.state = TaskState::Cancelled;
        }
    }

    fn is_finished(&self) -> bool {
        !matches!(self.state, TaskState::Running(_))
    }
}

impl<'a, T, E> fmt::Debug for Task<'a, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            TaskState::Running(_) => "Running",
            TaskState::Cancelled => "Cancelled",
            TaskState::Spent => "Spent",
        };
        f.debug_struct("Task").field("state", &state).finish()
    }
}

/// Suspends the current `async` block once
///
/// The future is pending on its first poll and ready on the second.
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

/// Future returned by [yield_now]
#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// A suspendable computation viewed as a future
///
/// Made by [Suspendable::awaiting]. Every poll is one step.
#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct Awaiting<S> {
    inner: S,
}

impl<S> Awaiting<S> {
    pub(crate) fn new(inner: S) -> Self {
        Awaiting { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Suspendable + Unpin> Future for Awaiting<S> {
    type Output = Result<S::Output, Error<S::Error>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.get_mut().inner.step() {
            Step::Suspended => {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Step::Completed(value) => Poll::Ready(Ok(value)),
            Step::Failed(error) => Poll::Ready(Err(error)),
        }
    }
}
