use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

slotmap::new_key_type! {
    /// Opaque token returned by [`Observable::subscribe`](crate::Observable::subscribe).
    ///
    /// Handles are generational: once removed, a handle never matches a later
    /// subscription, even if its slot is reused.
    pub struct SubscriptionHandle;
}

/// Runtime type of a subscriber passed to [`Observable::observe`](crate::Observable::observe).
#[derive(Clone, Copy)]
pub struct ObserverType {
    id: TypeId,
    name: &'static str,
}

impl ObserverType {
    pub fn of<O: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<O>(),
            name: std::any::type_name::<O>(),
        }
    }

    /// Type of the value behind `observer`. For `&dyn Any` this is the
    /// concrete type; the name stays the static one.
    pub fn of_val<O: Any + ?Sized>(observer: &O) -> Self {
        Self {
            id: Any::type_id(observer),
            name: std::any::type_name::<O>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

// Identity is the TypeId alone; the name is only for display.
impl PartialEq for ObserverType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObserverType {}

impl Hash for ObserverType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ObserverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObserverType").field(&self.name).finish()
    }
}

impl fmt::Display for ObserverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identifies one entry in an observable's registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionKey {
    /// Keyed by subscriber type: all instances of one type share this key.
    Type(ObserverType),
    /// Keyed by a handle from `subscribe`.
    Handle(SubscriptionHandle),
}

impl SubscriptionKey {
    pub fn observer_type(&self) -> Option<ObserverType> {
        match self {
            SubscriptionKey::Type(ty) => Some(*ty),
            SubscriptionKey::Handle(_) => None,
        }
    }

    pub fn handle(&self) -> Option<SubscriptionHandle> {
        match self {
            SubscriptionKey::Type(_) => None,
            SubscriptionKey::Handle(h) => Some(*h),
        }
    }
}
