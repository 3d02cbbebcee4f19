pub mod address;
pub mod email;
pub mod envelope;

pub use address::{Address, join_addresses};
pub use email::{Attachment, Disposition, Email, Header, MailMessage};
pub use envelope::{Envelope, SentMessage};
