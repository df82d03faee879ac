use observely_core::prelude::*;

/// A view-model holding a single observable counter.
pub struct CounterModel {
    counter: Observable<i32>,
}

impl CounterModel {
    pub fn new() -> Self {
        Self {
            counter: observable(0),
        }
    }

    pub fn counter(&self) -> i32 {
        self.counter.get()
    }

    /// Exposed for views that want to observe directly.
    pub fn observable(&self) -> &Observable<i32> {
        &self.counter
    }

    /// Start reporting the counter, beginning with its current value.
    pub fn start(&self, on_change: impl Fn(i32) + 'static) {
        self.counter.observe(self, DeliveryOption::Initial, move |value| {
            log::debug!("Step: {value}");
            on_change(*value)
        });
    }

    pub fn stop(&self) {
        self.counter.remove_observer(self);
    }

    pub fn increment(&self) {
        self.counter.update(|c| *c += 1);
    }

    pub fn decrement(&self) {
        self.counter.update(|c| *c -= 1);
    }
}

impl Default for CounterModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CounterModel {
    fn drop(&mut self) {
        log::debug!("Counter model dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_increment() {
        let model = CounterModel::new();
        model.increment();
        assert_eq!(model.counter(), 1);
    }

    #[test]
    fn test_decrement() {
        let model = CounterModel::new();
        model.decrement();
        assert_eq!(model.counter(), -1);
    }

    #[test]
    fn test_start_delivers_current_value() {
        let model = CounterModel::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        model.start(move |v| s.borrow_mut().push(v));
        assert_eq!(*seen.borrow(), vec![0]);

        model.increment();
        model.increment();
        model.decrement();
        assert_eq!(*seen.borrow(), vec![0, 1, 2, 1]);

        model.stop();
        model.increment();
        assert_eq!(seen.borrow().len(), 4);
        assert_eq!(model.observable().observer_count(), 0);
    }

    #[test]
    fn test_two_models_do_not_share_registrations() {
        let a = CounterModel::new();
        let b = CounterModel::new();
        a.start(|_| {});
        assert_eq!(a.observable().observer_count(), 1);
        assert_eq!(b.observable().observer_count(), 0);
    }
}
