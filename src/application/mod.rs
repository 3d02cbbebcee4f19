pub mod services;
pub mod webhook;
