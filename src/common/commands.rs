use std::path::PathBuf;

use super::events::SubscriptionId;
use super::types::{Credentials, MessageRecord};

/// Lệnh UI gửi xuống backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    /// Start delivering `AuthChanged`; the current state is reported immediately.
    AddAuthListener,
    RemoveAuthListener,
    SignIn(Credentials),
    SignOut,
    /// Subscribe to children of `path`; existing children are replayed as `ChildAdded`.
    Subscribe {
        subscription: SubscriptionId,
        path: String,
    },
    Unsubscribe {
        subscription: SubscriptionId,
    },
    /// Append a new child under `path` with a generated key.
    Push {
        path: String,
        record: MessageRecord,
    },
    /// Upload a local file to the photo bucket under its own file name.
    Upload {
        source: PathBuf,
    },
}
