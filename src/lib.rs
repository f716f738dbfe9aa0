#![doc = include_str!("../README.md")]

mod compat;
mod coroutine;
mod error;
mod functions;
mod step;
mod suspendable;

pub use coroutine::*;
pub use error::*;
pub use functions::*;
pub use step::*;
pub use suspendable::*;

pub mod executor;
pub mod gather;
pub mod sequence;
pub mod task;
