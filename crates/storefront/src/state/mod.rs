//! Client-side state container.
//!
//! # Architecture
//!
//! - A [`Reducer`] is a pure `(state, action) -> state` function
//! - A [`Store`] owns one state value, applies dispatched actions through its
//!   reducer and then notifies its [`Observer`]s
//! - Persistence is an observer ([`persistence::CartPersistence`]), so the
//!   reducers stay side-effect free
//!
//! Two stores exist per application: [`SessionStore`] and [`CartStore`].
//! They are created explicitly and handed to whoever needs them; nothing in
//! this module is a global.

pub mod cart;
pub mod persistence;
pub mod session;

use std::fmt;
use std::sync::{PoisonError, RwLock};

use serde::de::DeserializeOwned;
use tracing::debug;

pub use cart::{CartAction, CartReducer, CartState};
pub use session::{SessionAction, SessionReducer, SessionState};

/// Store holding the authenticated user.
pub type SessionStore = Store<SessionReducer>;

/// Store holding the cart line items.
pub type CartStore = Store<CartReducer>;

/// An action that can name itself for logs and breadcrumbs.
pub trait Action: fmt::Debug + Send + Sync {
    /// Wire name of the action kind (e.g. `ADD_TO_CART`).
    fn kind(&self) -> &'static str;

    /// Key/value pairs worth attaching to the dispatch breadcrumb.
    fn detail(&self) -> Option<Vec<(&'static str, String)>> {
        None
    }
}

/// A pure state transition function.
pub trait Reducer: Send + Sync + 'static {
    type State: Clone + Default + Send + Sync;
    type Action: Action;

    /// Compute the next state. Must not perform side effects.
    fn reduce(state: &Self::State, action: &Self::Action) -> Self::State;
}

/// Side effect applied after each dispatch.
pub trait Observer<R: Reducer>: Send + Sync {
    /// Called with the action just applied and the resulting state.
    fn after_dispatch(&self, action: &R::Action, state: &R::State);
}

/// A state container driven by a reducer.
///
/// Dispatch is synchronous: the next state replaces the current one
/// atomically and observers run before the write lock is released, so two
/// concurrent dispatches are always observed (and persisted) in the order
/// they were applied.
///
/// Observers therefore block every other dispatch and reader while they run.
/// Keep them short; a slow persistence backend (a network store, a sync to
/// disk) stalls the async tasks that touch the store.
pub struct Store<R: Reducer> {
    state: RwLock<R::State>,
    observers: Vec<Box<dyn Observer<R>>>,
}

impl<R: Reducer> Default for Store<R> {
    fn default() -> Self {
        Self::new(R::State::default())
    }
}

impl<R: Reducer> Store<R> {
    /// Create a store with the given initial state and no observers.
    #[must_use]
    pub fn new(initial: R::State) -> Self {
        Self {
            state: RwLock::new(initial),
            observers: Vec::new(),
        }
    }

    /// Attach an observer. Observers run in attachment order.
    #[must_use]
    pub fn with_observer(mut self, observer: impl Observer<R> + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Apply `action` and notify observers.
    pub fn dispatch(&self, action: R::Action) {
        // Reducers are pure, so a poisoned lock still guards a whole state.
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        self.apply(&mut guard, &action);
    }

    /// Derive an action from the current state and apply it atomically.
    ///
    /// `decide` runs under the write lock, so no other dispatch can change
    /// the state between reading it and applying the returned action.
    /// Returning `None` leaves the state untouched. Returns whether an
    /// action was applied.
    pub fn dispatch_with(&self, decide: impl FnOnce(&R::State) -> Option<R::Action>) -> bool {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let Some(action) = decide(&guard) else {
            return false;
        };
        self.apply(&mut guard, &action);
        true
    }

    fn apply(&self, state: &mut R::State, action: &R::Action) {
        *state = R::reduce(state, action);

        debug!(action = action.kind(), "Dispatched action");
        let detail = action.detail();
        let pairs: Option<Vec<(&str, &str)>> = detail
            .as_ref()
            .map(|pairs| pairs.iter().map(|(key, value)| (*key, value.as_str())).collect());
        crate::error::add_breadcrumb("state", action.kind(), pairs.as_deref());

        for observer in &self.observers {
            observer.after_dispatch(action, state);
        }
    }

    /// Decode a `{"type": ..., "payload": ...}` action and dispatch it.
    ///
    /// Unknown action kinds (or payloads that do not fit the kind) leave the
    /// state unchanged. Returns whether an action was dispatched.
    pub fn dispatch_json(&self, raw: serde_json::Value) -> bool
    where
        R::Action: DeserializeOwned,
    {
        match serde_json::from_value::<R::Action>(raw) {
            Ok(action) => {
                self.dispatch(action);
                true
            }
            Err(e) => {
                debug!(error = %e, "Ignoring unrecognized action");
                false
            }
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> R::State {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Borrow the current state without cloning it.
    pub fn with_state<T>(&self, f: impl FnOnce(&R::State) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

impl<R: Reducer> fmt::Debug for Store<R>
where
    R::State: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_state(|state| {
            f.debug_struct("Store")
                .field("state", state)
                .field("observers", &self.observers.len())
                .finish()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug)]
    enum Counter {
        Add(u32),
    }

    impl Action for Counter {
        fn kind(&self) -> &'static str {
            "ADD"
        }
    }

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = u32;
        type Action = Counter;

        fn reduce(state: &u32, action: &Counter) -> u32 {
            match action {
                Counter::Add(n) => state + n,
            }
        }
    }

    struct Recorder(Arc<Mutex<Vec<u32>>>);

    impl Observer<CounterReducer> for Recorder {
        fn after_dispatch(&self, _action: &Counter, state: &u32) {
            self.0.lock().unwrap().push(*state);
        }
    }

    #[test]
    fn test_observers_see_every_state_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store = Store::<CounterReducer>::default().with_observer(Recorder(Arc::clone(&seen)));

        store.dispatch(Counter::Add(1));
        store.dispatch(Counter::Add(2));

        assert_eq!(store.state(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_concurrent_dispatches_are_serialized() {
        let store = Arc::new(Store::<CounterReducer>::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.dispatch(Counter::Add(1));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.state(), 800);
    }

    #[test]
    fn test_dispatch_with_reads_and_applies_atomically() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::new(
            Store::<CounterReducer>::default().with_observer(Recorder(Arc::clone(&seen))),
        );

        // Add 1 only while the counter is below 10; without atomicity the
        // threads would overshoot.
        std::thread::scope(|scope| {
            for _ in 0..8 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for _ in 0..10 {
                        store.dispatch_with(|n| (*n < 10).then_some(Counter::Add(1)));
                    }
                });
            }
        });

        assert_eq!(store.state(), 10);
        assert_eq!(seen.lock().unwrap().len(), 10);
        assert!(!store.dispatch_with(|_| None));
        assert_eq!(seen.lock().unwrap().len(), 10);
    }
}
