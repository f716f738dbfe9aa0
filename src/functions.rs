//! Small coroutines and combinators built only from [bind] and [sleep]
//!
//! None of these need access to coroutine internals.

use super::*;

/// Suspends once, then completes with `value`
///
/// Injects a suspension point into a chain that would otherwise run to
/// completion in a single step. Use `awaitable(())` when no value is needed.
/// ```
/// use costep::*;
/// let mut co: Coroutine<&str, ()> = awaitable("hello");
/// assert_eq!(co.step(), Step::Suspended);
/// assert_eq!(co.step(), Step::Completed("hello"));
/// ```
pub fn awaitable<'a, T: 'a, E: 'a>(value: T) -> Coroutine<'a, T, E> {
    bind(sleep(), move |()| result(value))
}

/// Map the inner type of the coroutine
///
/// This is sugar of bind and result
/// ```
/// use costep::*;
/// let co: Coroutine<String, ()> = map(awaitable(1), |a| a.to_string());
/// ```
pub fn map<'a, T, U, E, F>(co: Coroutine<'a, T, E>, map: F) -> Coroutine<'a, U, E>
where
    F: FnOnce(T) -> U + 'a,
    T: 'a,
    U: 'a,
    E: 'a,
{
    bind(co, move |a| result(map(a)))
}

/// Convert E1 into E2
///
/// Sugar over bind_err
pub fn map_err<'a, T, E1, E2, F>(co: Coroutine<'a, T, E1>, f: F) -> Coroutine<'a, T, E2>
where
    F: FnOnce(E1) -> E2 + 'a,
    T: 'a,
    E1: 'a,
    E2: 'a,
{
    bind_err(co, move |e| fail(f(e)))
}

/// Runs two coroutines sequentially
///
/// This will run first until it completes, then second afterwards
/// until it completes
/// Returns both return results tupled together
pub fn tuple<'a, E, A, B>(
    first: Coroutine<'a, A, E>,
    second: Coroutine<'a, B, E>,
) -> Coroutine<'a, (A, B), E>
where
    A: 'a,
    B: 'a,
    E: 'a,
{
    bind(first, move |a| map(second, move |b| (a, b)))
}

/// Runs a routine before the second routine
///
/// Result of the first routine is ignored, second is returned
/// if you need both results, use tuple
pub fn right<'a, E, A, B>(left: Coroutine<'a, A, E>, right: Coroutine<'a, B, E>) -> Coroutine<'a, B, E>
where
    A: 'a,
    B: 'a,
    E: 'a,
{
    map(tuple(left, right), |(_, b)| b)
}

/// Runs a routine before the second routine
///
/// Result of the first routine is returned, second is ignored
/// if you need both results, use tuple
pub fn left<'a, E, A, B>(left: Coroutine<'a, A, E>, right: Coroutine<'a, B, E>) -> Coroutine<'a, A, E>
where
    A: 'a,
    B: 'a,
    E: 'a,
{
    map(tuple(left, right), |(a, _)| a)
}

/// Converts the return result to the unit type
///
/// Useful when you only care about what the coroutine does,
/// not what it returns
pub fn void<'a, E: 'a, A: 'a>(co: Coroutine<'a, A, E>) -> Coroutine<'a, (), E> {
    map(co, |_| ())
}
