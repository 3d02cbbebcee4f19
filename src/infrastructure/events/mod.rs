pub mod logging;

pub use logging::TracingEventBus;
