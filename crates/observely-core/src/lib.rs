//! # Observable values
//!
//! Observely is a tiny observable-value primitive for single-threaded state
//! propagation, e.g. a view-model property that a UI layer watches.
//!
//! - `Observable<T>`: a cloneable handle to a value plus its registered callbacks.
//! - `observe` / `subscribe`: register a callback, keyed either by the
//!   subscriber's type or by an opaque handle.
//! - `set` / `update` / `signal`: change (or re-announce) the value; every
//!   registered callback runs synchronously, in registration order.
//!
//! ```rust
//! use observely_core::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! struct Label;
//!
//! let count = observable(0);
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let label = Label;
//! count.observe(&label, DeliveryOption::Initial, {
//!     let seen = seen.clone();
//!     move |v| seen.borrow_mut().push(*v)
//! });
//! count.set(1);
//! count.update(|v| *v += 1);
//!
//! assert_eq!(*seen.borrow(), vec![0, 1, 2]);
//! ```
//!
//! ## Keys
//!
//! `observe(&observer, ..)` keys the callback by the *type* of `observer`. Two
//! different values of the same type share that key, so the second registration
//! silently replaces the first. When several subscribers of one type must
//! coexist, use `subscribe`, which returns a `SubscriptionHandle` to pass to
//! `unsubscribe` later.
//!
//! ## Initial delivery
//!
//! With `DeliveryOption::Initial` the current value is delivered at
//! registration time. By default (`InitialDelivery::Broadcast`) that delivery
//! goes to *every* registered callback, not just the new one; configure
//! `InitialDelivery::Newcomer` to limit it to the new subscriber:
//!
//! ```rust
//! use observely_core::*;
//!
//! let config = ObservableConfig::new()
//!     .with_initial_delivery(InitialDelivery::Newcomer)
//!     .with_reentrancy(Reentrancy::Queue);
//! let name = Observable::with_config(String::from("Marty"), config);
//! assert_eq!(name.get(), "Marty");
//! ```
//!
//! ## Reentrancy
//!
//! Callbacks may call back into the same observable. Under the default
//! `Reentrancy::Unguarded` a nested `set` delivers recursively (and a callback
//! that always sets again never returns). `Reentrancy::Queue` defers nested
//! deliveries until the current pass is done, and `try_set` / `try_signal`
//! refuse to nest at all, returning `ObservableError::Reentrant`.

pub mod config;
pub mod error;
pub mod key;
pub mod observable;
pub mod prelude;

pub use config::*;
pub use error::ObservableError;
pub use key::*;
pub use observable::*;
