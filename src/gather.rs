//! Driving many computations at once
//!
//! [Gather] steps a set of computations round-robin and collects their
//! results in the order the computations were given, no matter which one
//! finishes first. It is itself [Suspendable], so it runs under
//! [run](crate::executor::run), inside another gather, or anywhere else a
//! computation can go.
//!
//! Each step of the gather is one *round*: every child still pending is
//! stepped once, in input order. A child suspending does not end the round
//! early. Once the round is over, the gather suspends if anything is still
//! pending, so it suspends as many times as its longest running child.
//! ```
//! use costep::*;
//! use costep::gather::gather;
//! use costep::executor::run;
//!
//! let slow: Coroutine<i32, ()> = bind(sleep(), |()| awaitable(1));
//! let fast: Coroutine<i32, ()> = awaitable(2);
//! let now: Coroutine<i32, ()> = result(3);
//!
//! assert_eq!(run(gather(vec![slow, fast, now])), Ok(vec![1, 2, 3]));
//! ```
//!
//! # Failures
//!
//! The first child to fail, in input order within the failing round, ends
//! the gather and its error is returned as it is. Children after it in that
//! round are not stepped. What happens to the children that are still
//! unfinished depends on [GatherOptions::cancel_on_error].

use tracing::{debug, trace, warn};

use crate::{Error, Step, Suspendable};

/// Settings for a [Gather]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatherOptions {
    /// Cancel unfinished children when the gather fails, is cancelled, or is dropped early
    ///
    /// When false, unfinished children are left as they are. Lent children
    /// (`&mut`) stay usable by their owner, owned ones can be taken back with
    /// [Gather::into_remaining]. A child that is dropped without finishing
    /// or being cancelled leaks whatever its continuation holds until it is
    /// dropped, so take care to drive or cancel them.
    pub cancel_on_error: bool,
}

impl Default for GatherOptions {
    fn default() -> Self {
        GatherOptions {
            cancel_on_error: true,
        }
    }
}

impl GatherOptions {
    /// Same as the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [GatherOptions::cancel_on_error]
    pub fn cancel_on_error(mut self, cancel_on_error: bool) -> Self {
        self.cancel_on_error = cancel_on_error;
        self
    }
}

/// Per child bookkeeping, the slot index is the child's position
struct Slot<C: Suspendable> {
    /// `None` once the child finished
    child: Option<C>,
    result: Option<C::Output>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Cancelled,
    Finished,
}

/// Concurrently drives computations, keeping their results in input order
///
/// Built with [gather] or [gather_with].
pub struct Gather<C: Suspendable> {
    slots: Vec<Slot<C>>,
    options: GatherOptions,
    pending: usize,
    rounds: usize,
    phase: Phase,
}

/// Gathers the results of `children` into a vector with the same order
///
/// Unfinished children are cancelled if the gather fails.
/// See [gather_with] to change that.
pub fn gather<C, I>(children: I) -> Gather<C>
where
    I: IntoIterator<Item = C>,
    C: Suspendable,
{
    gather_with(children, GatherOptions::default())
}

/// Like [gather], with explicit options
/// ```
/// use costep::*;
/// use costep::gather::{gather_with, GatherOptions};
/// use costep::executor::run;
///
/// let mut broken: Coroutine<&str, &str> = fail("broken");
/// let mut second: Coroutine<&str, &str> = awaitable("second");
///
/// let options = GatherOptions::new().cancel_on_error(false);
/// let outcome = run(gather_with(vec![&mut broken, &mut second], options));
/// assert_eq!(outcome, Err(Error::Failed("broken")));
///
/// // second was never stepped, and still belongs to us
/// assert_eq!(run(&mut second), Ok("second"));
/// ```
pub fn gather_with<C, I>(children: I, options: GatherOptions) -> Gather<C>
where
    I: IntoIterator<Item = C>,
    C: Suspendable,
{
    let slots: Vec<Slot<C>> = children
        .into_iter()
        .map(|child| Slot {
            child: Some(child),
            result: None,
        })
        .collect();
    Gather {
        pending: slots.len(),
        slots,
        options,
        rounds: 0,
        phase: Phase::Running,
    }
}

impl<C: Suspendable> Gather<C> {
    /// Number of children that have not finished yet
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Number of rounds run so far
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// The options this gather was built with
    pub fn options(&self) -> GatherOptions {
        self.options
    }

    /// Gives back the children that neither finished nor were cancelled,
    /// with their positions
    ///
    /// Children handed back this way are never cancelled by the gather.
    pub fn into_remaining(mut self) -> Vec<(usize, C)> {
        self.pending = 0;
        std::mem::take(&mut self.slots)
            .into_iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.child.map(|child| (index, child)))
            .collect()
    }

    /// Steps every pending child once, in input order
    fn run_round(&mut self) -> Result<(), Error<C::Error>> {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(child) = slot.child.as_mut() else {
                continue;
            };
            match child.step() {
                Step::Suspended => {}
                Step::Completed(value) => {
                    slot.result = Some(value);
                    slot.child = None;
                    self.pending -= 1;
                }
                Step::Failed(error) => {
                    slot.child = None;
                    self.pending -= 1;
                    debug!(index, round = self.rounds, "gathered computation failed");
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    /// Cancels and releases every child still in a slot
    fn cancel_pending(&mut self) {
        let mut cancelled = 0usize;
        for slot in &mut self.slots {
            if let Some(mut child) = slot.child.take() {
                child.cancel();
                cancelled += 1;
            }
        }
        self.pending = 0;
        if cancelled > 0 {
            debug!(cancelled, "cancelled unfinished gathered computations");
        }
    }
}

impl<C: Suspendable> Suspendable for Gather<C> {
    type Output = Vec<C::Output>;
    type Error = C::Error;

    fn step(&mut self) -> Step<Self::Output, Error<Self::Error>> {
        match self.phase {
            Phase::Running => {}
            Phase::Cancelled => return Step::Failed(Error::Cancelled),
            Phase::Finished => panic!("gather stepped after it finished"),
        }

        self.rounds += 1;
        if let Err(error) = self.run_round() {
            self.phase = Phase::Finished;
            if self.options.cancel_on_error {
                self.cancel_pending();
            } else if self.pending > 0 {
                warn!(
                    remaining = self.pending,
                    "gather failed, leaving unfinished computations alive"
                );
            }
            return Step::Failed(error);
        }
        trace!(round = self.rounds, pending = self.pending, "gather round done");

        if self.pending > 0 {
            return Step::Suspended;
        }
        self.phase = Phase::Finished;
        let results = self
            .slots
            .iter_mut()
            .filter_map(|slot| slot.result.take())
            .collect();
        Step::Completed(results)
    }

    fn cancel(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.phase = Phase::Cancelled;
        if self.options.cancel_on_error {
            self.cancel_pending();
        }
    }

    fn is_finished(&self) -> bool {
        self.phase != Phase::Running
    }
}

impl<C: Suspendable> Drop for Gather<C> {
    fn drop(&mut self) {
        if self.phase == Phase::Running && self.pending > 0 && self.options.cancel_on_error {
            debug!(pending = self.pending, "unfinished gather dropped");
            self.cancel_pending();
        }
    }
}
