pub mod dashamail;
pub mod events;
