use std::fmt;

use super::types::User;

/// Handle identifying one feed subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Sự kiện từ backend gửi lên UI.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    AuthChanged(Option<User>),
    Feed {
        subscription: SubscriptionId,
        event: FeedEvent,
    },
    UploadCompleted {
        url: String,
    },
    Failed(Failure),
}

/// Child notifications of a subscribed path.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    ChildAdded(FeedChild),
    ChildChanged(FeedChild),
    ChildRemoved { key: String },
    ChildMoved(FeedChild),
    /// The subscription was dropped by the backend and delivers nothing more.
    Cancelled { reason: String },
}

/// Raw child as stored in the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedChild {
    pub key: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SignIn,
    SignOut,
    Push,
    Upload,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::SignIn => f.write_str("sign-in"),
            Operation::SignOut => f.write_str("sign-out"),
            Operation::Push => f.write_str("send"),
            Operation::Upload => f.write_str("upload"),
        }
    }
}

/// A backend operation that did not complete.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub operation: Operation,
    pub message: String,
}

impl Failure {
    pub fn new(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}
