/// Who receives the current value when a subscription asks for
/// [`DeliveryOption::Initial`](crate::DeliveryOption::Initial).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InitialDelivery {
    /// Every registered callback is re-notified, not just the new one.
    #[default]
    Broadcast,
    /// Only the callback being registered is called.
    Newcomer,
}

/// What happens when a callback triggers another delivery on the same container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Reentrancy {
    /// Nested deliveries run immediately, recursively. A callback that always
    /// sets the value again never terminates.
    #[default]
    Unguarded,
    /// Nested deliveries are queued and drained, oldest first, by the outermost
    /// call before it returns. The value itself is still assigned immediately.
    Queue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ObservableConfig {
    pub initial_delivery: InitialDelivery,
    pub reentrancy: Reentrancy,
}

impl ObservableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_delivery(mut self, initial_delivery: InitialDelivery) -> Self {
        self.initial_delivery = initial_delivery;
        self
    }

    pub fn with_reentrancy(mut self, reentrancy: Reentrancy) -> Self {
        self.reentrancy = reentrancy;
        self
    }
}
