pub mod message;
pub mod response;
pub mod user;

pub use message::*;
pub use response::*;
pub use user::*;
