pub use crate::{
    DeliveryOption, InitialDelivery, Observable, ObservableConfig, ObservableError, Reentrancy,
    SubscriptionHandle, SubscriptionKey, observable,
};
