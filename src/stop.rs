/*
Early exits for searches driven from the command line.

The engine has no cancellation of its own; it only stops when expansion
fails. Wrapping an infallible expansion callback with `guard` turns a Ctrl-C
or "target settled" into that failure, and the partial result is still there
to use afterwards.
*/

use crate::search::Halted;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Stop {
    #[error("search interrupted")]
    Interrupted,

    #[error("target reached")]
    Reached,
}

#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag that Ctrl-C sets. If a handler is already installed for the
    /// process, the flag is returned unhooked.
    pub fn on_ctrlc() -> Self {
        let flag = Self::new();
        let hook = flag.clone();
        if let Err(e) = ctrlc::set_handler(move || hook.trigger()) {
            tracing::warn!(error = %e, "could not install Ctrl-C handler");
        }
        flag
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Wraps `expand` so that it fails with [`Stop::Interrupted`] once `interrupt`
/// is set, and with [`Stop::Reached`] when asked to expand `target`. A settled
/// target has its final distance and a complete predecessor chain, so the
/// partial result answers the point-to-point query.
pub fn guard<T, D, I, X>(
    target: Option<T>,
    interrupt: Interrupt,
    mut expand: X,
) -> impl FnMut(&T, D) -> Result<Option<I>, Stop>
where
    T: PartialEq,
    X: FnMut(&T, D) -> Option<I>,
{
    move |node: &T, dist: D| {
        if interrupt.is_set() {
            return Err(Stop::Interrupted);
        }
        if target.as_ref() == Some(node) {
            return Err(Stop::Reached);
        }
        Ok(expand(node, dist))
    }
}

/// Splits a search outcome into whatever was built and the reason it stopped
/// early, if it did.
pub fn split_outcome<R, E>(result: Result<R, Halted<R, E>>) -> (R, Option<E>) {
    match result {
        Ok(done) => (done, None),
        Err(halted) => {
            let (partial, error) = halted.into_parts();
            (partial, Some(error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::path_to;
    use crate::search::explore;

    fn line(n: u32) -> impl FnMut(&u32, u32) -> Option<Vec<(u32, u32)>> {
        move |&node: &u32, _: u32| (node + 1 < n).then(|| vec![(node + 1, 1)])
    }

    #[test]
    fn stops_when_target_settles() {
        let (explored, stop) = split_outcome(explore(0, |_| 0, guard(Some(3), Interrupt::new(), line(10))));
        assert_eq!(stop, Some(Stop::Reached));
        assert_eq!(explored.done.len(), 4);
        assert_eq!(explored.settled_distance(&3), Some(3));
        assert_eq!(path_to(&explored.prev, &0, &3), Some(vec![0, 1, 2, 3]));
        assert!(!explored.dist.contains_key(&5));
    }

    #[test]
    fn runs_to_completion_without_target() {
        let (explored, stop) = split_outcome(explore(0, |_| 0, guard(None, Interrupt::new(), line(5))));
        assert_eq!(stop, None);
        assert_eq!(explored.done.len(), 5);
    }

    #[test]
    fn interrupt_halts_with_partial_result() {
        let interrupt = Interrupt::new();
        let trip = interrupt.clone();
        let mut inner = line(100);
        let expand = move |node: &u32, d: u32| {
            if *node == 4 {
                trip.trigger();
            }
            inner(node, d)
        };
        let (explored, stop) = split_outcome(explore(0, |_| 0, guard(None, interrupt.clone(), expand)));
        assert_eq!(stop, Some(Stop::Interrupted));
        assert!(interrupt.is_set());
        // Node 4 expanded before the flag was seen; node 5 was discovered but not expanded.
        assert_eq!(explored.done.len(), 6);
        assert!(explored.prev.contains_key(&5));
        assert!(!explored.prev.contains_key(&6));
    }
}
