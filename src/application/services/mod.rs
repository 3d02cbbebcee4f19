pub mod event_bus;
pub mod transport;
