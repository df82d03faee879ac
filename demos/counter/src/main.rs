use counter::CounterModel;
use observely_core::prelude::*;

struct Label;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let model = CounterModel::new();
    model.start(|value| println!("Count: {value}"));

    // A second view type; `Initial` re-announces the value to every observer.
    let label = Label;
    model
        .observable()
        .observe(&label, DeliveryOption::Initial, |value| {
            log::info!("label now reads {value}")
        });

    model.increment();
    model.increment();
    model.decrement();

    model
        .observable()
        .try_signal(Some(Box::new(|| log::info!("refreshing observers"))))?;

    log::info!(
        "{} observer(s) before stop",
        model.observable().observer_count()
    );
    model.stop();
    model.observable().remove_observer(&label);
    model.increment();

    println!("Final count: {}", model.counter());
    Ok(())
}
