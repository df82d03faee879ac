use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::config::{InitialDelivery, ObservableConfig, Reentrancy};
use crate::error::{ObservableError, Result};
use crate::key::{ObserverType, SubscriptionHandle, SubscriptionKey};

type Callback<T> = Rc<dyn Fn(&T)>;

/// Whether a new subscription is called right away with the current value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DeliveryOption {
    /// Call with the current value at registration, then on every change.
    #[default]
    Initial,
    /// Call only on subsequent `set` / `signal`.
    New,
}

/// A value plus the callbacks that want to hear about it.
///
/// `Observable` is a cheap, cloneable handle; clones share the same value and
/// registry. Every operation runs synchronously on the calling thread. The
/// registry is not borrowed while callbacks run, so a callback may freely read,
/// write, subscribe or unsubscribe on the same observable.
pub struct Observable<T>(Rc<RefCell<Inner<T>>>);

struct Entry<T> {
    key: SubscriptionKey,
    callback: Callback<T>,
}

struct Inner<T> {
    value: T,
    entries: SlotMap<SubscriptionHandle, Entry<T>>,
    // registration order; replaced type keys keep their slot
    order: SmallVec<[SubscriptionHandle; 4]>,
    by_type: HashMap<TypeId, SubscriptionHandle>,
    config: ObservableConfig,
    delivering: bool,
    pending: VecDeque<Delivery<T>>,
}

#[derive(Clone, Copy)]
enum Target {
    All,
    One(SubscriptionHandle),
}

struct Delivery<T> {
    value: T,
    target: Target,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self::with_config(value, ObservableConfig::default())
    }

    pub fn with_config(value: T, config: ObservableConfig) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            value,
            entries: SlotMap::with_key(),
            order: SmallVec::new(),
            by_type: HashMap::new(),
            config,
            delivering: false,
            pending: VecDeque::new(),
        })))
    }

    pub fn config(&self) -> ObservableConfig {
        self.0.borrow().config
    }

    /// Borrow the current value without cloning it.
    ///
    /// Panics if `f` writes to this observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow().value)
    }

    /// Registry keys in registration order.
    pub fn observers(&self) -> Vec<SubscriptionKey> {
        let inner = self.0.borrow();
        inner
            .order
            .iter()
            .filter_map(|h| inner.entries.get(*h))
            .map(|e| e.key)
            .collect()
    }

    pub fn observer_count(&self) -> usize {
        self.0.borrow().entries.len()
    }

    /// True if some value of `observer`'s runtime type is registered through `observe`.
    pub fn is_observed_by<O: Any + ?Sized>(&self, observer: &O) -> bool {
        let ty = ObserverType::of_val(observer);
        self.0.borrow().by_type.contains_key(&ty.id())
    }

    pub fn is_delivering(&self) -> bool {
        self.0.borrow().delivering
    }

    /// Drop the registration made by `observer`'s runtime type, if any.
    pub fn remove_observer<O: Any + ?Sized>(&self, observer: &O) {
        let ty = ObserverType::of_val(observer);
        let mut inner = self.0.borrow_mut();
        if let Some(h) = inner.by_type.remove(&ty.id()) {
            inner.remove_entry(h);
            log::trace!("observable: removed observer {ty}");
        }
    }

    /// Returns whether `handle` was still registered.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut inner = self.0.borrow_mut();
        let Some(entry) = inner.entries.get(handle) else {
            return false;
        };
        // type-keyed entries are only reachable through `remove_observer`
        if entry.key.handle().is_none() {
            return false;
        }
        inner.remove_entry(handle);
        log::trace!("observable: unsubscribed {handle:?}");
        true
    }

    pub fn remove_all_observers(&self) {
        let mut inner = self.0.borrow_mut();
        inner.entries.clear();
        inner.order.clear();
        inner.by_type.clear();
        log::trace!("observable: removed all observers");
    }

    fn register(&self, ty: Option<ObserverType>, callback: Callback<T>) -> SubscriptionHandle {
        let mut inner = self.0.borrow_mut();
        let inner = &mut *inner;

        if let Some(ty) = ty
            && let Some(&h) = inner.by_type.get(&ty.id())
            && let Some(entry) = inner.entries.get_mut(h)
        {
            // Same type, different instance or not: the old callback is gone.
            entry.callback = callback;
            log::trace!("observable: replaced observer {ty}");
            return h;
        }

        let h = inner.entries.insert_with_key(|h| Entry {
            key: ty.map_or(SubscriptionKey::Handle(h), SubscriptionKey::Type),
            callback,
        });
        inner.order.push(h);
        if let Some(ty) = ty {
            inner.by_type.insert(ty.id(), h);
            log::trace!("observable: added observer {ty}");
        } else {
            log::trace!("observable: subscribed {h:?}");
        }
        h
    }
}

impl<T> Inner<T> {
    fn remove_entry(&mut self, h: SubscriptionHandle) {
        self.entries.remove(h);
        self.order.retain(|o| *o != h);
    }
}

impl<T: Clone> Observable<T> {
    pub fn get(&self) -> T {
        self.0.borrow().value.clone()
    }

    /// Replace the value and deliver it to every registered callback.
    pub fn set(&self, v: T) {
        let value = {
            let mut inner = self.0.borrow_mut();
            inner.value = v;
            inner.value.clone()
        };
        self.dispatch(value, Target::All);
    }

    /// Mutate the value in place, then deliver like [`set`](Self::set).
    ///
    /// Panics if `f` touches this observable.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let value = {
            let mut inner = self.0.borrow_mut();
            f(&mut inner.value);
            inner.value.clone()
        };
        self.dispatch(value, Target::All);
    }

    /// Like [`set`](Self::set), but refuses to nest inside a running delivery.
    /// On refusal the value is left untouched.
    pub fn try_set(&self, v: T) -> Result<()> {
        if self.is_delivering() {
            return Err(ObservableError::Reentrant);
        }
        self.set(v);
        Ok(())
    }

    /// Register `on_change` under the runtime type of `observer`.
    ///
    /// Only one callback per type is kept: a second `observe` from any value of
    /// the same type replaces the first one's callback. A `&dyn Any` observer is
    /// keyed by the concrete type behind it.
    pub fn observe<O: Any + ?Sized>(
        &self,
        observer: &O,
        option: DeliveryOption,
        on_change: impl Fn(&T) + 'static,
    ) {
        let h = self.register(Some(ObserverType::of_val(observer)), Rc::new(on_change));
        self.deliver_initial(h, option);
    }

    /// Register `on_change` under a fresh handle. Unlike `observe`, two
    /// subscriptions never replace each other.
    pub fn subscribe(
        &self,
        option: DeliveryOption,
        on_change: impl Fn(&T) + 'static,
    ) -> SubscriptionHandle {
        let h = self.register(None, Rc::new(on_change));
        self.deliver_initial(h, option);
        h
    }

    /// Run `side_effect` (if any), then deliver the current value to every
    /// registered callback.
    pub fn signal(&self, side_effect: Option<Box<dyn FnOnce() + '_>>) {
        if let Some(f) = side_effect {
            f();
        }
        let value = self.get();
        self.dispatch(value, Target::All);
    }

    /// Shorthand for `signal(Some(Box::new(side_effect)))`.
    pub fn signal_with(&self, side_effect: impl FnOnce()) {
        self.signal(Some(Box::new(side_effect)));
    }

    /// Re-deliver the current value.
    pub fn notify(&self) {
        self.signal(None);
    }

    /// Like [`signal`](Self::signal), but refuses to nest inside a running
    /// delivery. On refusal `side_effect` is not run.
    pub fn try_signal(&self, side_effect: Option<Box<dyn FnOnce() + '_>>) -> Result<()> {
        if self.is_delivering() {
            return Err(ObservableError::Reentrant);
        }
        self.signal(side_effect);
        Ok(())
    }

    fn deliver_initial(&self, h: SubscriptionHandle, option: DeliveryOption) {
        if option == DeliveryOption::New {
            return;
        }
        let (value, target) = {
            let inner = self.0.borrow();
            let target = match inner.config.initial_delivery {
                InitialDelivery::Broadcast => Target::All,
                InitialDelivery::Newcomer => Target::One(h),
            };
            (inner.value.clone(), target)
        };
        self.dispatch(value, target);
    }

    fn dispatch(&self, value: T, target: Target) {
        {
            let mut inner = self.0.borrow_mut();
            if inner.delivering && inner.config.reentrancy == Reentrancy::Queue {
                inner.pending.push_back(Delivery { value, target });
                log::debug!(
                    "observable: nested delivery queued ({} pending)",
                    inner.pending.len()
                );
                return;
            }
        }

        let _guard = DeliveryGuard::enter(&self.0);
        let mut next = Some(Delivery { value, target });
        while let Some(delivery) = next {
            self.run(&delivery);
            next = self.0.borrow_mut().pending.pop_front();
        }
    }

    fn run(&self, delivery: &Delivery<T>) {
        // Snapshot so callbacks can mutate the registry while we iterate.
        let callbacks: SmallVec<[Callback<T>; 4]> = {
            let inner = self.0.borrow();
            match delivery.target {
                Target::All => inner
                    .order
                    .iter()
                    .filter_map(|h| inner.entries.get(*h))
                    .map(|e| e.callback.clone())
                    .collect(),
                Target::One(h) => inner
                    .entries
                    .get(h)
                    .map(|e| e.callback.clone())
                    .into_iter()
                    .collect(),
            }
        };
        log::trace!("observable: delivering to {} callback(s)", callbacks.len());
        for cb in callbacks {
            cb(&delivery.value);
        }
    }
}

// Marks the observable as delivering for the guard's lifetime; restored on
// unwind too, so a panicking callback does not wedge the container.
struct DeliveryGuard<'a, T> {
    inner: &'a RefCell<Inner<T>>,
    prev: bool,
}

impl<'a, T> DeliveryGuard<'a, T> {
    fn enter(inner: &'a RefCell<Inner<T>>) -> Self {
        let prev = std::mem::replace(&mut inner.borrow_mut().delivering, true);
        Self { inner, prev }
    }
}

impl<T> Drop for DeliveryGuard<'_, T> {
    fn drop(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.delivering = self.prev;
        if !self.prev {
            inner.pending.clear();
        }
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for Observable<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("observers", &inner.entries.len())
            .finish()
    }
}

pub fn observable<T>(value: T) -> Observable<T> {
    Observable::new(value)
}
