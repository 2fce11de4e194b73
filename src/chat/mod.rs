// src/chat/mod.rs — Chat session state

pub mod events;
pub mod store;
pub mod types;

pub use events::{Notice, StoreEvent};
pub use store::{ChatState, ChatStore, StorePhase};
pub use types::{ChatMode, Message, MessageState, Sender};
