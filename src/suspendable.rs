//! The contract every driver in this crate relies on
//!
//! A driver only ever does three things with a computation: step it,
//! cancel it, and ask whether it has finished. Anything implementing
//! [Suspendable] can therefore be run by [run](crate::executor::run),
//! gathered by [gather](crate::gather::gather), or awaited from `async` code.

use crate::task::Awaiting;
use crate::{Error, Step};

/// A single-use unit of deferred work, advanced one step at a time
///
/// Only one driver may step a computation at a time; this is what the
/// `&mut self` receivers express.
pub trait Suspendable {
    /// Value produced on completion
    type Output;
    /// Error raised by the computation itself
    type Error;

    /// Advances the computation to its next suspension point, or to the end
    ///
    /// # Panics
    ///
    /// Implementations panic when stepped again after having returned
    /// `Completed` or `Failed`, except for a cancelled computation,
    /// which keeps answering `Failed(Error::Cancelled)`.
    fn step(&mut self) -> Step<Self::Output, Error<Self::Error>>;

    /// Terminates an unfinished computation without producing a value
    ///
    /// Does nothing if the computation already finished.
    fn cancel(&mut self);

    /// Whether the outcome was already delivered, or the computation was cancelled
    fn is_finished(&self) -> bool;

    /// Erases the concrete type, so differently built computations
    /// can be gathered together
    fn boxed<'a>(self) -> BoxSuspendable<'a, Self::Output, Self::Error>
    where
        Self: Sized + 'a,
    {
        Box::new(self)
    }

    /// Adapts this computation into a future
    fn awaiting(self) -> Awaiting<Self>
    where
        Self: Sized,
    {
        Awaiting::new(self)
    }
}

/// A type erased computation
pub type BoxSuspendable<'a, T, E> = Box<dyn Suspendable<Output = T, Error = E> + 'a>;

impl<S: Suspendable + ?Sized> Suspendable for &mut S {
    type Output = S::Output;
    type Error = S::Error;

    fn step(&mut self) -> Step<Self::Output, Error<Self::Error>> {
        (**self).step()
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }
}

impl<S: Suspendable + ?Sized> Suspendable for Box<S> {
    type Output = S::Output;
    type Error = S::Error;

    fn step(&mut self) -> Step<Self::Output, Error<Self::Error>> {
        (**self).step()
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }
}
