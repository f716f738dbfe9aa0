//! Lazy sequences that suspend before every element
//!
//! A [LazySeq] is the coroutine counterpart of an iterator. Pulling an
//! element is itself a coroutine: it takes the next element from the source,
//! suspends once, and then hands the element over. Running out of elements
//! does not suspend.
//!
//! Pulling consumes the sequence and hands back the rest, so a sequence is
//! single-pass and can only ever be driven by one consumer.
//! ```
//! use costep::*;
//! use costep::sequence::aiterable;
//! use costep::executor::run;
//!
//! let doubled: Coroutine<Vec<i32>, ()> = aiterable(vec![1, 2, 3]).fold(vec![], |mut acc, x| {
//!     acc.push(x * 2);
//!     acc
//! });
//! assert_eq!(run(doubled), Ok(vec![2, 4, 6]));
//! ```

use std::ops::Range;

use crate::{bind, defer, result, sleep, Coroutine, ZeroStepError};

/// A single-pass sequence that suspends before yielding each element
#[derive(Debug)]
pub struct LazySeq<I> {
    source: I,
}

/// Wraps any finite iterable into a [LazySeq]
pub fn aiterable<I: IntoIterator>(iterable: I) -> LazySeq<I::IntoIter> {
    LazySeq {
        source: iterable.into_iter(),
    }
}

/// Lazy variant of an integer range
///
/// Accepts a plain `start..stop` range, or an [IntRange] for other steps.
/// ```
/// use costep::*;
/// use costep::sequence::{arange, IntRange};
/// use costep::executor::run;
///
/// let down = IntRange::new(4, 0, -1).unwrap();
/// let co: Coroutine<Vec<i64>, ()> = arange(down).collect();
/// assert_eq!(run(co), Ok(vec![4, 3, 2, 1]));
/// ```
pub fn arange<R: Into<IntRange>>(range: R) -> LazySeq<IntRange> {
    aiterable(range.into())
}

impl<I: Iterator> LazySeq<I> {
    /// Pulls the next element, returning it together with the rest of the sequence
    ///
    /// Suspends once before an element is returned. Completes with `None`
    /// without suspending once the source is exhausted.
    pub fn next<'a, E: 'a>(mut self) -> Coroutine<'a, Option<(I::Item, Self)>, E>
    where
        I: 'a,
        I::Item: 'a,
    {
        defer(move || match self.source.next() {
            Some(item) => bind(sleep(), move |()| result(Some((item, self)))),
            None => result(None),
        })
    }

    /// Combines every element into an accumulator
    pub fn fold<'a, B, F, E>(self, init: B, f: F) -> Coroutine<'a, B, E>
    where
        F: FnMut(B, I::Item) -> B + 'a,
        I: 'a,
        I::Item: 'a,
        B: 'a,
        E: 'a,
    {
        bind(self.next(), move |next| match next {
            Some((item, rest)) => {
                let mut f = f;
                let acc = f(init, item);
                rest.fold(acc, f)
            }
            None => result(init),
        })
    }

    /// Runs a coroutine for every element, one after the other
    ///
    /// The body can suspend as well; its suspensions come on top of the
    /// one in front of every element.
    pub fn for_each<'a, F, E>(self, f: F) -> Coroutine<'a, (), E>
    where
        F: FnMut(I::Item) -> Coroutine<'a, (), E> + 'a,
        I: 'a,
        I::Item: 'a,
        E: 'a,
    {
        bind(self.next(), move |next| match next {
            Some((item, rest)) => {
                let mut f = f;
                let body = f(item);
                bind(body, move |()| rest.for_each(f))
            }
            None => result(()),
        })
    }

    /// Collects every element into a container
    pub fn collect<'a, C, E>(self) -> Coroutine<'a, C, E>
    where
        C: Default + Extend<I::Item> + 'a,
        I: 'a,
        I::Item: 'a,
        E: 'a,
    {
        self.fold(C::default(), |mut acc, item| {
            acc.extend(Some(item));
            acc
        })
    }
}

/// A half-open integer range with a non-zero step
///
/// Counts from `start` towards `stop`, excluding `stop`, like the usual
/// `range(start, stop, step)`. A negative step counts down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    next: i64,
    stop: i64,
    step: i64,
}

impl IntRange {
    pub fn new(start: i64, stop: i64, step: i64) -> Result<Self, ZeroStepError> {
        if step == 0 {
            return Err(ZeroStepError);
        }
        Ok(IntRange {
            next: start,
            stop,
            step,
        })
    }
}

impl From<Range<i64>> for IntRange {
    fn from(range: Range<i64>) -> Self {
        IntRange {
            next: range.start,
            stop: range.end,
            step: 1,
        }
    }
}

impl Iterator for IntRange {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let remaining = if self.step > 0 {
            self.next < self.stop
        } else {
            self.next > self.stop
        };
        if !remaining {
            return None;
        }
        let value = self.next;
        // an overflowing step can only land past `stop`
        self.next = self.next.checked_add(self.step).unwrap_or(self.stop);
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Step, Suspendable};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Co<T> = Coroutine<'static, T, ()>;

    #[test]
    fn aiterable_suspends_before_each_element() {
        let mut co: Co<Vec<i32>> = aiterable(vec![1, 2, 3]).collect();
        for _ in 0..3 {
            assert_eq!(co.step(), Step::Suspended);
        }
        assert_eq!(co.step(), Step::Completed(vec![1, 2, 3]));
    }

    #[test]
    fn arange_counts_down() {
        let mut co: Co<Vec<i64>> = arange(IntRange::new(4, 0, -1).unwrap()).collect();
        for _ in 0..4 {
            assert_eq!(co.step(), Step::Suspended);
        }
        assert_eq!(co.step(), Step::Completed(vec![4, 3, 2, 1]));
    }

    #[test]
    fn arange_from_plain_range() {
        let mut co: Co<Vec<i64>> = arange(0..3).collect();
        let mut suspensions = 0;
        let values = loop {
            match co.step() {
                Step::Suspended => suspensions += 1,
                other => break other.completed(),
            }
        };
        assert_eq!(suspensions, 3);
        assert_eq!(values, Some(vec![0, 1, 2]));
    }

    #[test]
    fn empty_source_completes_without_suspending() {
        let mut co: Co<Vec<i32>> = aiterable(Vec::<i32>::new()).collect();
        assert_eq!(co.step(), Step::Completed(vec![]));
    }

    #[test]
    fn element_is_pulled_before_the_suspension() {
        let pulled = Rc::new(RefCell::new(vec![]));
        let log = pulled.clone();
        let source = (1..=2).inspect(move |x| log.borrow_mut().push(*x));
        let mut co: Co<Vec<i32>> = aiterable(source).collect();

        assert_eq!(co.step(), Step::Suspended);
        assert_eq!(*pulled.borrow(), vec![1]);
        assert_eq!(co.step(), Step::Suspended);
        assert_eq!(*pulled.borrow(), vec![1, 2]);
        assert_eq!(co.step(), Step::Completed(vec![1, 2]));
    }

    #[test]
    fn for_each_body_can_suspend() {
        let seen = Rc::new(RefCell::new(vec![]));
        let log = seen.clone();
        let mut co: Co<()> = aiterable(vec!['a', 'b']).for_each(move |c| {
            let log = log.clone();
            bind(sleep(), move |()| {
                log.borrow_mut().push(c);
                result(())
            })
        });

        // one suspension per element, one per body
        for _ in 0..4 {
            assert_eq!(co.step(), Step::Suspended);
        }
        assert_eq!(co.step(), Step::Completed(()));
        assert_eq!(*seen.borrow(), vec!['a', 'b']);
    }

    #[test]
    fn cancelled_sequence_stops_pulling() {
        let mut co: Co<Vec<i64>> = arange(0..10).collect();
        assert_eq!(co.step(), Step::Suspended);
        co.cancel();
        assert_eq!(co.step(), Step::Failed(Error::Cancelled));
    }

    #[test]
    fn zero_step_is_rejected() {
        assert_eq!(IntRange::new(0, 10, 0), Err(ZeroStepError));
    }

    #[test]
    fn int_range_matches_half_open_semantics() {
        let up: Vec<i64> = IntRange::new(0, 10, 3).unwrap().collect();
        let empty: Vec<i64> = IntRange::new(5, 0, 1).unwrap().collect();
        let near_max: Vec<i64> = IntRange::new(i64::MAX - 1, i64::MAX, 5).unwrap().collect();

        assert_eq!(up, vec![0, 3, 6, 9]);
        assert!(empty.is_empty());
        assert_eq!(near_max, vec![i64::MAX - 1]);
    }
}
