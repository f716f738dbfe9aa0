//! Method syntax and do-notation for coroutines
//!
//! Long chains of nested `bind` calls get hard to read. The methods here let
//! a chain read left to right, and the `m!` macro from `do-notation` lets it
//! read like straight-line code. Neither is required.
//!```
//! use costep::*;
//! use costep::executor::run;
//! use ::do_notation::m;
//!
//! // The coroutine in do-notation
//! let co: Coroutine<String, ()> = m! {
//!     value_1 <- awaitable(1);
//!     sleep();
//!     value_2 <- awaitable(2);
//!     let sum = i32::wrapping_add(value_1, value_2);
//!     result(sum.to_string())
//! };
//!
//! assert_eq!(run(co), Ok("3".to_string()));
//!```
use crate::*;
use ::do_notation::Lift;

impl<'a, T, E> Lift<T> for Coroutine<'a, T, E> {
    /// Creates coroutine from a value
    ///
    /// see [result](function@result)
    fn lift(a: T) -> Self {
        result(a)
    }
}

impl<'a, T: 'a, E: 'a> Coroutine<'a, T, E> {
    /// Chains coroutines
    ///
    /// see [bind](function@bind)
    pub fn and_then<F: 'a, U: 'a>(self, f: F) -> Coroutine<'a, U, E>
    where
        F: FnOnce(T) -> Coroutine<'a, U, E>,
    {
        bind(self, f)
    }

    /// Maps the completed value
    ///
    /// see [map](function@map)
    pub fn map<F: 'a, U: 'a>(self, f: F) -> Coroutine<'a, U, E>
    where
        F: FnOnce(T) -> U,
    {
        map(self, f)
    }

    /// Recovers from a failure
    ///
    /// see [bind_err](function@bind_err)
    pub fn or_else<F: 'a, E2: 'a>(self, f: F) -> Coroutine<'a, T, E2>
    where
        F: FnOnce(E) -> Coroutine<'a, T, E2>,
    {
        bind_err(self, f)
    }

    /// Converts the error type
    ///
    /// see [map_err](function@map_err)
    pub fn map_err<F: 'a, E2: 'a>(self, f: F) -> Coroutine<'a, T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        map_err(self, f)
    }
}
