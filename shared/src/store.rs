//! Plan Store: the single holder of the current plan
//!
//! The store owns one slot and a durable mirror of it. `set_plan` is the
//! only mutator; it rewrites the mirror and notifies observers. Generation
//! tickets let a caller that awaited a slow completion find out that a newer
//! request (or a clear) happened in the meantime, so stale responses are
//! dropped instead of overwriting the newer state.

use crate::errors::StoreError;
use crate::models::{Plan, StoredPlan};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Fixed key of the persisted `{user, plan}` record
pub const PLAN_STORAGE_KEY: &str = "generatedPlan";

/// Durable key-value collaborator backing the store
///
/// Values are the JSON text of a [`StoredPlan`].
pub trait PlanMirror {
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&mut self, value: &str) -> Result<(), StoreError>;
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// In-memory mirror, cloneable so tests can inspect what was persisted
#[derive(Debug, Clone, Default)]
pub struct MemoryMirror {
    value: Arc<Mutex<Option<String>>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror pre-seeded with a raw value
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(value.into()))),
        }
    }

    /// Current persisted text
    pub fn snapshot(&self) -> Option<String> {
        self.value.lock().ok().and_then(|v| v.clone())
    }
}

impl PlanMirror for MemoryMirror {
    fn load(&self) -> Result<Option<String>, StoreError> {
        self.value
            .lock()
            .map(|v| v.clone())
            .map_err(|_| StoreError::Mirror("mirror lock poisoned".to_string()))
    }

    fn save(&mut self, value: &str) -> Result<(), StoreError> {
        let mut slot = self
            .value
            .lock()
            .map_err(|_| StoreError::Mirror("mirror lock poisoned".to_string()))?;
        *slot = Some(value.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        let mut slot = self
            .value
            .lock()
            .map_err(|_| StoreError::Mirror("mirror lock poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}

/// Proof that a caller started a generation; see [`PlanStore::commit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationTicket(u64);

impl GenerationTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Handle returned by [`PlanStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(Option<&StoredPlan>) + Send>;

/// Holder of the current plan with a persisted mirror
pub struct PlanStore<M: PlanMirror> {
    current: Option<StoredPlan>,
    mirror: M,
    observers: HashMap<u64, Observer>,
    next_subscription: u64,
    latest_ticket: u64,
}

impl<M: PlanMirror> PlanStore<M> {
    /// Create a store, restoring whatever the mirror holds
    ///
    /// A mirror holding something other than a stored plan is reported as
    /// [`StoreError::Corrupt`]; the caller decides whether to clear it.
    pub fn open(mirror: M) -> Result<Self, StoreError> {
        let current = match mirror.load()? {
            Some(text) => Some(
                serde_json::from_str::<StoredPlan>(&text)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            current,
            mirror,
            observers: HashMap::new(),
            next_subscription: 0,
            latest_ticket: 0,
        })
    }

    /// Create an empty store, discarding anything the mirror holds
    pub fn reset(mut mirror: M) -> Result<Self, StoreError> {
        mirror.clear()?;
        Self::open(mirror)
    }

    /// Current plan, if any
    pub fn get_plan(&self) -> Option<&Plan> {
        self.current.as_ref().map(|stored| &stored.plan)
    }

    /// Current `{user, plan}` record, if any
    pub fn current(&self) -> Option<&StoredPlan> {
        self.current.as_ref()
    }

    /// Replace the slot, rewrite the mirror and notify observers
    ///
    /// Setting `None` clears the mirror and invalidates any generation in
    /// flight. The slot only changes once the mirror write succeeded.
    pub fn set_plan(&mut self, plan: Option<StoredPlan>) -> Result<(), StoreError> {
        match &plan {
            Some(stored) => {
                let text = serde_json::to_string(stored)
                    .map_err(|e| StoreError::Mirror(e.to_string()))?;
                self.mirror.save(&text)?;
            }
            None => {
                self.mirror.clear()?;
                self.latest_ticket += 1;
            }
        }

        self.current = plan;
        for observer in self.observers.values_mut() {
            observer(self.current.as_ref());
        }
        Ok(())
    }

    /// Start a generation; any earlier ticket becomes stale
    pub fn begin_generation(&mut self) -> GenerationTicket {
        self.latest_ticket += 1;
        GenerationTicket(self.latest_ticket)
    }

    /// Whether a ticket is still the most recent one
    pub fn is_current(&self, ticket: GenerationTicket) -> bool {
        ticket.0 == self.latest_ticket
    }

    /// Store the result of a generation if nothing newer happened since
    pub fn commit(&mut self, ticket: GenerationTicket, plan: StoredPlan) -> Result<(), StoreError> {
        if !self.is_current(ticket) {
            return Err(StoreError::StaleGeneration {
                ticket: ticket.0,
                latest: self.latest_ticket,
            });
        }
        self.set_plan(Some(plan))
    }

    /// Register an observer called after every `set_plan`
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(Option<&StoredPlan>) + Send + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.observers.insert(id, Box::new(observer));
        SubscriptionId(id)
    }

    /// Remove an observer; returns whether it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(&id.0).is_some()
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UserProfile, WorkoutDay};

    fn stored(tip: &str) -> StoredPlan {
        StoredPlan {
            user: UserProfile::default(),
            plan: Plan {
                workout: vec![WorkoutDay::default()],
                tips: vec![tip.to_string()],
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_set_plan_writes_mirror_and_get_returns_it() {
        let mirror = MemoryMirror::new();
        let mut store = PlanStore::open(mirror.clone()).unwrap();
        assert!(store.get_plan().is_none());

        store.set_plan(Some(stored("a"))).unwrap();

        assert_eq!(store.get_plan().unwrap().tips, vec!["a".to_string()]);
        let persisted: StoredPlan = serde_json::from_str(&mirror.snapshot().unwrap()).unwrap();
        assert_eq!(persisted, stored("a"));
    }

    #[test]
    fn test_open_restores_from_mirror() {
        let text = serde_json::to_string(&stored("restored")).unwrap();
        let store = PlanStore::open(MemoryMirror::with_value(text)).unwrap();
        assert_eq!(store.get_plan().unwrap().tips[0], "restored");
    }

    #[test]
    fn test_open_reports_corrupt_mirror() {
        let result = PlanStore::open(MemoryMirror::with_value("{not json"));
        assert!(matches!(result, Err(StoreError::Corrupt(_))));

        let store = PlanStore::reset(MemoryMirror::with_value("{not json")).unwrap();
        assert!(store.get_plan().is_none());
        assert!(store.mirror().snapshot().is_none());
    }

    #[test]
    fn test_clear_removes_mirror() {
        let mirror = MemoryMirror::new();
        let mut store = PlanStore::open(mirror.clone()).unwrap();
        store.set_plan(Some(stored("a"))).unwrap();
        store.set_plan(None).unwrap();

        assert!(store.get_plan().is_none());
        assert!(mirror.snapshot().is_none());
    }

    #[test]
    fn test_observers_see_every_update() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut store = PlanStore::open(MemoryMirror::new()).unwrap();
        let sink = Arc::clone(&seen);
        let id = store.subscribe(move |plan| {
            sink.lock()
                .unwrap()
                .push(plan.map(|p| p.plan.tips[0].clone()));
        });

        store.set_plan(Some(stored("a"))).unwrap();
        store.set_plan(None).unwrap();
        assert!(store.unsubscribe(id));
        store.set_plan(Some(stored("b"))).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![Some("a".to_string()), None]);
    }

    #[test]
    fn test_stale_generation_is_rejected() {
        let mut store = PlanStore::open(MemoryMirror::new()).unwrap();
        let first = store.begin_generation();
        let second = store.begin_generation();

        store.commit(second, stored("second")).unwrap();
        let err = store.commit(first, stored("first")).unwrap_err();

        assert_eq!(
            err,
            StoreError::StaleGeneration {
                ticket: first.value(),
                latest: second.value()
            }
        );
        assert_eq!(store.get_plan().unwrap().tips[0], "second");
    }

    #[test]
    fn test_clear_invalidates_in_flight_generation() {
        let mut store = PlanStore::open(MemoryMirror::new()).unwrap();
        let ticket = store.begin_generation();
        store.set_plan(None).unwrap();

        assert!(!store.is_current(ticket));
        assert!(store.commit(ticket, stored("late")).is_err());
        assert!(store.get_plan().is_none());
    }

    struct FailingMirror;

    impl PlanMirror for FailingMirror {
        fn load(&self) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
        fn save(&mut self, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Mirror("disk full".to_string()))
        }
        fn clear(&mut self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_mirror_write_leaves_slot_unchanged() {
        let mut store = PlanStore::open(FailingMirror).unwrap();
        assert!(store.set_plan(Some(stored("a"))).is_err());
        assert!(store.get_plan().is_none());
    }
}
