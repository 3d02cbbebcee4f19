pub mod api;
pub mod dsn;
pub mod error_codes;
pub mod factory;
pub mod payload;
pub mod smtp;

pub use api::DashaMailApiTransport;
pub use dsn::Dsn;
pub use factory::{DashaMailTransport, DashaMailTransportFactory};
pub use smtp::DashaMailSmtpTransport;

/// Tracking switches fixed for the lifetime of a transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackingOptions {
    pub no_track_opens: bool,
    pub no_track_clicks: bool,
}
