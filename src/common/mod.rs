pub mod commands;
pub mod events;
pub mod types;

pub use commands::BackendCommand;
pub use events::{BackendEvent, Failure, FeedChild, FeedEvent, Operation, SubscriptionId};
pub use types::{ANONYMOUS, Credentials, Message, MessageBody, MessageRecord, PickerRequest, Provider, User};
