pub mod auth_service;
pub mod mail_service;
pub mod message_service;
pub mod user_service;

pub use mail_service::{build_mailer, Mailer};
