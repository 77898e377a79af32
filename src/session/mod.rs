//! Screen controller: auth state, the feed subscription and the message list.
//!
//! The session never talks to the backend directly. Every input returns the
//! effects it wants carried out, which keeps all state changes on the UI
//! thread and makes the state machine testable without a window.

mod feed;
mod message_list;
mod routing;

pub use feed::FeedListener;
pub use message_list::MessageList;
pub use routing::{Outcome, ScreenResult};

use std::time::Duration;

use crate::common::{
    ANONYMOUS, BackendCommand, BackendEvent, FeedEvent, MessageRecord, Operation, PickerRequest,
    Provider, SubscriptionId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    SignedIn,
}

/// Everything the screen reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    /// Window restored / shown.
    Resumed,
    /// Window minimized.
    Paused,
    Backend(BackendEvent),
    ScreenResult(ScreenResult),
    /// Raw composer text; the composer only submits when it is sendable.
    SendText(String),
    PickPhoto,
    SignOutSelected,
}

/// Work requested by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Command(BackendCommand),
    Notice(Notice),
    LaunchSignIn { providers: Vec<Provider> },
    LaunchPhotoPicker(PickerRequest),
    CloseScreen,
}

/// Transient, non-blocking message shown over the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub duration: Duration,
}

impl Notice {
    pub fn short(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration: Duration::from_millis(2000),
        }
    }

    pub fn long(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration: Duration::from_millis(3500),
        }
    }
}

pub struct Session {
    state: SessionState,
    username: String,
    feed_path: String,
    feed: FeedListener,
    messages: MessageList,
    uploads_in_flight: usize,
}

impl Session {
    pub fn new(feed_path: impl Into<String>) -> Self {
        Self {
            state: SessionState::SignedOut,
            username: ANONYMOUS.to_string(),
            feed_path: feed_path.into(),
            feed: FeedListener::new(),
            messages: MessageList::default(),
            uploads_in_flight: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn messages(&self) -> &MessageList {
        &self.messages
    }

    #[cfg(test)]
    pub fn feed(&self) -> &FeedListener {
        &self.feed
    }

    pub fn uploads_in_flight(&self) -> usize {
        self.uploads_in_flight
    }

    pub fn handle(&mut self, input: SessionInput) -> Vec<Effect> {
        match input {
            SessionInput::Resumed => vec![Effect::Command(BackendCommand::AddAuthListener)],
            SessionInput::Paused => {
                let mut effects = vec![Effect::Command(BackendCommand::RemoveAuthListener)];
                self.messages.clear();
                effects.extend(self.feed.deactivate().map(Effect::Command));
                effects
            }
            SessionInput::Backend(event) => self.on_backend_event(event),
            SessionInput::ScreenResult(result) => self.on_screen_result(result),
            SessionInput::SendText(text) => {
                let record = MessageRecord::text(text, self.username.clone());
                vec![self.push(record)]
            }
            SessionInput::PickPhoto => vec![Effect::LaunchPhotoPicker(PickerRequest::jpeg())],
            SessionInput::SignOutSelected => vec![Effect::Command(BackendCommand::SignOut)],
        }
    }

    fn on_backend_event(&mut self, event: BackendEvent) -> Vec<Effect> {
        match event {
            BackendEvent::AuthChanged(Some(user)) => self.on_signed_in(user.display_name),
            BackendEvent::AuthChanged(None) => self.on_signed_out(),
            BackendEvent::Feed {
                subscription,
                event,
            } => self.on_feed_event(subscription, event),
            BackendEvent::UploadCompleted { url } => {
                self.uploads_in_flight = self.uploads_in_flight.saturating_sub(1);
                let record = MessageRecord::image(url, self.username.clone());
                vec![self.push(record)]
            }
            BackendEvent::Failed(failure) => {
                if failure.operation == Operation::Upload {
                    self.uploads_in_flight = self.uploads_in_flight.saturating_sub(1);
                }
                log::warn!("{} failed: {}", failure.operation, failure.message);
                let mut effects = vec![Effect::Notice(Notice::short(format!(
                    "Could not {}: {}",
                    failure.operation, failure.message
                )))];
                // The sign-in form is gone once confirmed; offer it again.
                let signed_out = self.state == SessionState::SignedOut;
                if failure.operation == Operation::SignIn && signed_out {
                    effects.push(Effect::LaunchSignIn {
                        providers: Provider::ALL.to_vec(),
                    });
                }
                effects
            }
        }
    }

    fn on_signed_in(&mut self, display_name: String) -> Vec<Effect> {
        log::info!("Signed in as {display_name}");
        self.username = display_name;
        self.state = SessionState::SignedIn;
        self.feed
            .activate(&self.feed_path)
            .map(Effect::Command)
            .into_iter()
            .collect()
    }

    fn on_signed_out(&mut self) -> Vec<Effect> {
        log::info!("Signed out; requesting sign-in");
        self.username.clear();
        self.messages.clear();
        self.state = SessionState::SignedOut;

        let mut effects: Vec<Effect> = self.feed.deactivate().map(Effect::Command).into_iter().collect();
        effects.push(Effect::LaunchSignIn {
            providers: Provider::ALL.to_vec(),
        });
        effects
    }

    fn on_feed_event(&mut self, subscription: SubscriptionId, event: FeedEvent) -> Vec<Effect> {
        if !self.feed.accepts(subscription) {
            log::debug!("Dropping event from detached {subscription}");
            return Vec::new();
        }

        match event {
            FeedEvent::ChildAdded(child) => match MessageRecord::decode(&child.key, &child.value) {
                Ok(message) => {
                    log::debug!("Message {} from {}", message.key, message.sender);
                    self.messages.push(message);
                    Vec::new()
                }
                Err(err) => {
                    log::warn!("Skipping feed child: {err}");
                    vec![Effect::Notice(Notice::short("Skipped a malformed message"))]
                }
            },
            FeedEvent::ChildChanged(child) | FeedEvent::ChildMoved(child) => {
                log::debug!("Ignoring update to {}", child.key);
                Vec::new()
            }
            FeedEvent::ChildRemoved { key } => {
                log::debug!("Ignoring removal of {key}");
                Vec::new()
            }
            FeedEvent::Cancelled { reason } => {
                log::warn!("Feed subscription {subscription} cancelled: {reason}");
                self.feed.cancelled(subscription);
                vec![Effect::Notice(Notice::short("Message feed unavailable"))]
            }
        }
    }

    fn push(&self, record: MessageRecord) -> Effect {
        Effect::Command(BackendCommand::Push {
            path: self.feed_path.clone(),
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::common::{Credentials, Failure, FeedChild, MessageBody, User};
    use serde_json::json;

    fn user(name: &str) -> User {
        User {
            uid: format!("uid-{name}"),
            display_name: name.to_string(),
            provider: Provider::Email,
            email: None,
        }
    }

    fn signed_in(name: &str) -> (Session, SubscriptionId) {
        let mut session = Session::new("messages");
        let effects = session.handle(SessionInput::Backend(BackendEvent::AuthChanged(Some(
            user(name),
        ))));
        let subscription = match effects.as_slice() {
            [Effect::Command(BackendCommand::Subscribe { subscription, path })] => {
                assert_eq!(path, "messages");
                *subscription
            }
            other => panic!("unexpected effects {other:?}"),
        };
        (session, subscription)
    }

    fn child_added(subscription: SubscriptionId, key: &str, value: serde_json::Value) -> SessionInput {
        SessionInput::Backend(BackendEvent::Feed {
            subscription,
            event: FeedEvent::ChildAdded(FeedChild {
                key: key.to_string(),
                value,
            }),
        })
    }

    #[test]
    fn starts_signed_out_as_anonymous() {
        let session = Session::new("messages");
        assert_eq!(session.state(), SessionState::SignedOut);
        assert_eq!(session.username(), ANONYMOUS);
        assert!(!session.feed().is_active());
    }

    #[test]
    fn sign_in_captures_name_and_attaches_feed() {
        let (session, _) = signed_in("Ada");
        assert_eq!(session.state(), SessionState::SignedIn);
        assert_eq!(session.username(), "Ada");
        assert!(session.feed().is_active());
    }

    #[test]
    fn repeated_sign_in_notification_keeps_one_subscription() {
        let (mut session, _) = signed_in("Ada");
        let effects = session.handle(SessionInput::Backend(BackendEvent::AuthChanged(Some(
            user("Ada"),
        ))));
        assert!(effects.is_empty());
        assert_eq!(session.feed().subscribe_count(), 1);
    }

    #[test]
    fn sign_out_clears_list_detaches_and_requests_sign_in() {
        let (mut session, subscription) = signed_in("Ada");
        session.handle(child_added(subscription, "k1", json!({ "text": "hi", "name": "Ada" })));
        assert_eq!(session.messages().len(), 1);

        let effects = session.handle(SessionInput::Backend(BackendEvent::AuthChanged(None)));

        assert_eq!(
            effects,
            vec![
                Effect::Command(BackendCommand::Unsubscribe { subscription }),
                Effect::LaunchSignIn {
                    providers: vec![Provider::Email, Provider::Google]
                },
            ]
        );
        assert!(session.messages().is_empty());
        assert!(!session.feed().is_active());
        assert_eq!(session.username(), "");
        assert_eq!(session.state(), SessionState::SignedOut);
    }

    #[test]
    fn initial_signed_out_notification_only_requests_sign_in() {
        let mut session = Session::new("messages");
        let effects = session.handle(SessionInput::Backend(BackendEvent::AuthChanged(None)));
        assert!(matches!(effects.as_slice(), [Effect::LaunchSignIn { .. }]));
    }

    #[test]
    fn feed_children_render_as_typed_rows() {
        let (mut session, subscription) = signed_in("Ada");
        session.handle(child_added(subscription, "k1", json!({ "text": "hello", "name": "Ada" })));
        session.handle(child_added(
            subscription,
            "k2",
            json!({ "name": "Ada", "photoUrl": "file:///blobs/Photos/a.jpg" }),
        ));

        let rows: Vec<_> = session.messages().iter().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sender, "Ada");
        assert_eq!(rows[0].body, MessageBody::Text("hello".into()));
        assert!(rows[1].is_image());
    }

    #[test]
    fn malformed_child_leaves_list_unchanged_with_notice() {
        let (mut session, subscription) = signed_in("Ada");
        let effects = session.handle(child_added(
            subscription,
            "bad",
            json!({ "text": "x", "photoUrl": "y" }),
        ));
        assert!(matches!(effects.as_slice(), [Effect::Notice(_)]));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn change_remove_and_move_are_ignored() {
        let (mut session, subscription) = signed_in("Ada");
        session.handle(child_added(subscription, "k1", json!({ "text": "v1" })));
        let child = FeedChild {
            key: "k1".into(),
            value: json!({ "text": "v2" }),
        };

        for event in [
            FeedEvent::ChildChanged(child.clone()),
            FeedEvent::ChildMoved(child),
            FeedEvent::ChildRemoved { key: "k1".into() },
        ] {
            let effects = session.handle(SessionInput::Backend(BackendEvent::Feed {
                subscription,
                event,
            }));
            assert!(effects.is_empty());
        }
        assert_eq!(session.messages().len(), 1);
        assert_eq!(
            session.messages().iter().next().unwrap().body,
            MessageBody::Text("v1".into())
        );
    }

    #[test]
    fn events_from_detached_subscription_are_dropped() {
        let (mut session, subscription) = signed_in("Ada");
        session.handle(SessionInput::Backend(BackendEvent::AuthChanged(None)));
        session.handle(child_added(subscription, "late", json!({ "text": "late" })));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn cancelled_subscription_is_released_with_notice() {
        let (mut session, subscription) = signed_in("Ada");
        let effects = session.handle(SessionInput::Backend(BackendEvent::Feed {
            subscription,
            event: FeedEvent::Cancelled {
                reason: "disk I/O error".into(),
            },
        }));
        assert!(matches!(effects.as_slice(), [Effect::Notice(_)]));
        assert!(!session.feed().is_active());
    }

    #[test]
    fn send_text_pushes_raw_text_with_username() {
        let (mut session, _) = signed_in("Ada");
        let effects = session.handle(SessionInput::SendText("  hi there ".into()));
        assert_eq!(
            effects,
            vec![Effect::Command(BackendCommand::Push {
                path: "messages".into(),
                record: MessageRecord {
                    text: Some("  hi there ".into()),
                    name: Some("Ada".into()),
                    photo_url: None,
                },
            })]
        );
    }

    #[test]
    fn completed_upload_pushes_exactly_one_image_message() {
        let (mut session, _) = signed_in("Ada");
        session.handle(SessionInput::ScreenResult(ScreenResult::PhotoPicker(
            Outcome::Confirmed(PathBuf::from("/home/ada/cat.jpg")),
        )));
        assert_eq!(session.uploads_in_flight(), 1);

        let effects = session.handle(SessionInput::Backend(BackendEvent::UploadCompleted {
            url: "file:///blobs/Photos/cat.jpg".into(),
        }));
        assert_eq!(
            effects,
            vec![Effect::Command(BackendCommand::Push {
                path: "messages".into(),
                record: MessageRecord {
                    text: None,
                    name: Some("Ada".into()),
                    photo_url: Some("file:///blobs/Photos/cat.jpg".into()),
                },
            })]
        );
        assert_eq!(session.uploads_in_flight(), 0);
    }

    #[test]
    fn failed_upload_surfaces_notice_and_clears_progress() {
        let (mut session, _) = signed_in("Ada");
        session.handle(SessionInput::ScreenResult(ScreenResult::PhotoPicker(
            Outcome::Confirmed(PathBuf::from("/tmp/x.jpg")),
        )));
        let effects = session.handle(SessionInput::Backend(BackendEvent::Failed(Failure::new(
            Operation::Upload,
            "No such file",
        ))));
        assert!(matches!(effects.as_slice(), [Effect::Notice(notice)] if notice.text.contains("upload")));
        assert_eq!(session.uploads_in_flight(), 0);
    }

    #[test]
    fn failed_sign_in_reopens_the_sign_in_flow() {
        let mut session = Session::new("messages");
        let effects = session.handle(SessionInput::Backend(BackendEvent::Failed(Failure::new(
            Operation::SignIn,
            "Permission denied",
        ))));

        assert_eq!(
            effects,
            vec![
                Effect::Notice(Notice::short("Could not sign-in: Permission denied")),
                Effect::LaunchSignIn {
                    providers: vec![Provider::Email, Provider::Google]
                },
            ]
        );
        assert_eq!(session.state(), SessionState::SignedOut);
    }

    #[test]
    fn failed_push_only_notifies() {
        let (mut session, _) = signed_in("Ada");
        let effects = session.handle(SessionInput::Backend(BackendEvent::Failed(Failure::new(
            Operation::Push,
            "database is locked",
        ))));
        assert!(matches!(effects.as_slice(), [Effect::Notice(_)]));
        assert_eq!(session.state(), SessionState::SignedIn);
    }

    #[test]
    fn confirmed_sign_in_does_not_run_cancel_path() {
        let mut session = Session::new("messages");
        let credentials = Credentials {
            provider: Provider::Google,
            display_name: "Ada".into(),
            email: None,
        };
        let effects = session.handle(SessionInput::ScreenResult(ScreenResult::SignIn(
            Outcome::Confirmed(credentials.clone()),
        )));

        assert_eq!(
            effects,
            vec![
                Effect::Notice(Notice::long("Welcome to the Chat App!")),
                Effect::Command(BackendCommand::SignIn(credentials)),
            ]
        );
    }

    #[test]
    fn cancelled_sign_in_notifies_and_closes() {
        let mut session = Session::new("messages");
        let effects = session.handle(SessionInput::ScreenResult(ScreenResult::SignIn(
            Outcome::Cancelled,
        )));
        assert_eq!(
            effects,
            vec![
                Effect::Notice(Notice::short("Sign-in Cancelled!")),
                Effect::CloseScreen,
            ]
        );
    }

    #[test]
    fn cancelled_photo_pick_does_nothing() {
        let (mut session, _) = signed_in("Ada");
        let effects = session.handle(SessionInput::ScreenResult(ScreenResult::PhotoPicker(
            Outcome::Cancelled,
        )));
        assert!(effects.is_empty());
        assert_eq!(session.uploads_in_flight(), 0);
    }

    #[test]
    fn pick_photo_requests_local_jpeg() {
        let mut session = Session::new("messages");
        let effects = session.handle(SessionInput::PickPhoto);
        assert_eq!(effects, vec![Effect::LaunchPhotoPicker(PickerRequest::jpeg())]);
    }

    #[test]
    fn pause_releases_listeners_and_resume_reregisters_auth() {
        let (mut session, subscription) = signed_in("Ada");
        session.handle(child_added(subscription, "k1", json!({ "text": "hi" })));

        let effects = session.handle(SessionInput::Paused);
        assert_eq!(
            effects,
            vec![
                Effect::Command(BackendCommand::RemoveAuthListener),
                Effect::Command(BackendCommand::Unsubscribe { subscription }),
            ]
        );
        assert!(session.messages().is_empty());

        let effects = session.handle(SessionInput::Resumed);
        assert_eq!(effects, vec![Effect::Command(BackendCommand::AddAuthListener)]);

        // Auth fires again on re-registration and the feed is re-attached.
        let effects = session.handle(SessionInput::Backend(BackendEvent::AuthChanged(Some(
            user("Ada"),
        ))));
        assert!(matches!(
            effects.as_slice(),
            [Effect::Command(BackendCommand::Subscribe { .. })]
        ));
        assert_eq!(session.feed().subscribe_count(), 2);
    }

    #[test]
    fn sign_out_menu_asks_backend() {
        let (mut session, _) = signed_in("Ada");
        assert_eq!(
            session.handle(SessionInput::SignOutSelected),
            vec![Effect::Command(BackendCommand::SignOut)]
        );
    }
}
