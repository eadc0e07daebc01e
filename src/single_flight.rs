//! Per-key request coalescing ("single-flight").
//!
//! Guarantees that at most one evaluation of the load function is in flight
//! per key at any instant: concurrent callers for the same key during a
//! cold miss all observe the exact `(value, error)` the one evaluation
//! produced, instead of each hammering the upstream loader or peer
//! independently. This is what keeps a miss storm on one hot key from
//! turning into N duplicate loads.

use crate::error::DistCacheError;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};

type CallResult<T> = Result<T, DistCacheError>;

enum State<T> {
    Pending,
    Done(CallResult<T>),
}

struct Call<T> {
    state: Mutex<State<T>>,
    cond: Condvar,
}

/// Whether a [`SingleFlight::do_call`] caller led the evaluation of `fn` or
/// joined an evaluation already in flight. Callers use this to attribute
/// metrics (e.g. "coalesced load" counters) without `SingleFlight` itself
/// needing to know about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// This call registered the key and evaluated `fn` itself.
    Leader,
    /// This call observed an in-flight evaluation and waited for it.
    Follower,
}

/// Coalesces concurrent loads for the same key into a single evaluation.
///
/// No memoization: once the in-flight call completes and is removed from the
/// index, the next call for that key evaluates `fn` again.
pub struct SingleFlight<T> {
    calls: Mutex<HashMap<String, Arc<Call<T>>>>,
}

impl<T> std::fmt::Debug for SingleFlight<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.calls.lock().unwrap().len())
            .finish_non_exhaustive()
    }
}

impl<T: Clone> Default for SingleFlight<T> {
    fn default() -> Self {
        SingleFlight {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Clone> SingleFlight<T> {
    /// Creates an empty coalescer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` for `key`, or waits for and returns another caller's
    /// in-flight evaluation if one is already underway.
    pub fn do_call<F>(&self, key: &str, f: F) -> (Role, CallResult<T>)
    where
        F: FnOnce() -> CallResult<T>,
    {
        let existing_or_new = {
            let mut calls = self.calls.lock().unwrap();
            if let Some(call) = calls.get(key) {
                Err(Arc::clone(call))
            } else {
                let call = Arc::new(Call {
                    state: Mutex::new(State::Pending),
                    cond: Condvar::new(),
                });
                calls.insert(key.to_string(), Arc::clone(&call));
                Ok(call)
            }
        };

        match existing_or_new {
            Err(call) => (Role::Follower, Self::wait(&call)),
            Ok(call) => {
                // Evaluate outside the index mutex: `f` may run arbitrarily
                // long (a remote fetch, a slow loader) and must never hold
                // up lookups for unrelated keys.
                let guard = LeaderGuard {
                    flight: self,
                    key,
                    call: &call,
                };
                let result = f();
                let result = guard.finish(result);
                (Role::Leader, result)
            }
        }
    }

    fn wait(call: &Call<T>) -> CallResult<T> {
        let mut state = call.state.lock().unwrap();
        loop {
            match &*state {
                State::Done(result) => return result.clone(),
                State::Pending => {
                    state = call.cond.wait(state).unwrap();
                }
            }
        }
    }
}

/// Ensures the call entry is published and the index entry is removed even
/// if the leader's evaluation panics — followers must still be woken with
/// *some* result rather than blocking forever.
struct LeaderGuard<'a, T: Clone> {
    flight: &'a SingleFlight<T>,
    key: &'a str,
    call: &'a Arc<Call<T>>,
}

impl<'a, T: Clone> LeaderGuard<'a, T> {
    fn finish(self, result: CallResult<T>) -> CallResult<T> {
        self.publish(result.clone());
        result
    }

    fn publish(&self, result: CallResult<T>) {
        {
            let mut state = self.call.state.lock().unwrap();
            *state = State::Done(result);
        }
        self.call.cond.notify_all();
        self.flight.calls.lock().unwrap().remove(self.key);
    }
}

impl<'a, T: Clone> Drop for LeaderGuard<'a, T> {
    fn drop(&mut self) {
        // If `f()` panicked before `finish` ran, `call`'s state is still
        // `Pending` — wake followers with a synthetic failure instead of
        // leaving them blocked forever, then clean up the index entry.
        let still_pending = matches!(&*self.call.state.lock().unwrap(), State::Pending);
        if still_pending {
            self.publish(Err(DistCacheError::UpstreamLoadFailure(
                "single-flight leader panicked".to_string(),
            )));
        }
    }
}
