//! Support messages

pub mod models;
mod poller;
mod service;
mod thread;

pub use models::{MessageId, MessageQuery, NewMessage, SupportMessage};
pub use poller::*;
pub use service::*;
pub use thread::*;
