/// The outcome of advancing a computation by one unit
///
/// This is the only thing a computation tells its driver.
/// A computation that returned `Completed` or `Failed` is finished
/// and must not be stepped again.
/// ```
/// use costep::*;
///
/// let mut co: Coroutine<(), ()> = sleep();
/// assert_eq!(co.step(), Step::Suspended);
/// assert_eq!(co.step(), Step::Completed(()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step<T, E> {
    /// Paused at a suspension point, not finished
    Suspended,
    /// Finished with a value
    Completed(T),
    /// Finished with an error
    Failed(E),
}

impl<T, E> Step<T, E> {
    /// True while the computation is paused
    pub const fn is_suspended(&self) -> bool {
        matches!(self, Step::Suspended)
    }

    /// True if the computation finished with a value
    pub const fn is_completed(&self) -> bool {
        matches!(self, Step::Completed(_))
    }

    /// True if the computation finished with an error
    pub const fn is_failed(&self) -> bool {
        matches!(self, Step::Failed(_))
    }

    /// True for both terminal outcomes
    pub const fn is_finished(&self) -> bool {
        !self.is_suspended()
    }

    /// The completed value, if any
    pub fn completed(self) -> Option<T> {
        match self {
            Step::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// Converts a terminal outcome into a result
    ///
    /// Returns `None` while suspended.
    pub fn into_result(self) -> Option<Result<T, E>> {
        match self {
            Step::Suspended => None,
            Step::Completed(value) => Some(Ok(value)),
            Step::Failed(error) => Some(Err(error)),
        }
    }

    pub fn map<U, F>(self, f: F) -> Step<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Step::Suspended => Step::Suspended,
            Step::Completed(value) => Step::Completed(f(value)),
            Step::Failed(error) => Step::Failed(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspended_is_not_finished() {
        let step: Step<i32, ()> = Step::Suspended;
        assert!(step.is_suspended());
        assert!(!step.is_finished());
        assert_eq!(step.into_result(), None);
    }

    #[test]
    fn terminal_outcomes_convert_to_results() {
        let done: Step<i32, &str> = Step::Completed(3);
        let failed: Step<i32, &str> = Step::Failed("boom");

        assert_eq!(done.map(|v| v * 2).completed(), Some(6));
        assert_eq!(failed.into_result(), Some(Err("boom")));
        assert!(failed.is_finished());
    }
}
