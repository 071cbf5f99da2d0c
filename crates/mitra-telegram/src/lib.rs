pub mod attach;
pub mod copy;
pub mod dispatch;
pub mod error;
pub mod send;

pub use dispatch::Dispatcher;
pub use error::SendError;
pub use send::{MessageSender, TelegramSender};
