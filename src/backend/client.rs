use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::common::{
    BackendCommand, BackendEvent, Credentials, Failure, FeedEvent, MessageRecord, Operation,
    SubscriptionId, User,
};
use crate::config::AppConfig;
use crate::error::{ChatError, Result};
use crate::storage::{self, BlobStore, FeedDatabase, IdentityStore};

use super::feed::FeedCursor;

/// Backend task standing in for the hosted services: identity, the ordered
/// message feed and the photo bucket. It only talks to the UI through the
/// command and event channels.
pub struct BackendClient {
    event_sender: mpsc::Sender<BackendEvent>,
    command_receiver: mpsc::Receiver<BackendCommand>,
    feed: FeedDatabase,
    blobs: BlobStore,
    identity: IdentityStore,
    photos_path: String,
    poll_interval: Duration,
    current_user: Option<User>,
    auth_listening: bool,
    subscriptions: BTreeMap<SubscriptionId, FeedCursor>,
}

impl BackendClient {
    pub fn new(
        config: &AppConfig,
        event_sender: mpsc::Sender<BackendEvent>,
        command_receiver: mpsc::Receiver<BackendCommand>,
    ) -> Result<Self> {
        storage::ensure_data_dir(&config.data_dir)?;
        let feed = FeedDatabase::with_path(config.feed_db_path())?;
        let identity = IdentityStore::new(config.identity_path());
        let current_user = identity.load();

        Ok(Self {
            event_sender,
            command_receiver,
            feed,
            blobs: BlobStore::new(config.blob_root()),
            identity,
            photos_path: config.photos_path.clone(),
            poll_interval: config.poll_interval(),
            current_user,
            auth_listening: false,
            subscriptions: BTreeMap::new(),
        })
    }

    pub async fn run(mut self) -> Result<()> {
        match &self.current_user {
            Some(user) => log::info!("Restored session for {}", user.display_name),
            None => log::info!("No stored session; waiting for sign-in"),
        }

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::info!("Backend event loop started");

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command).await,
                        None => break,
                    }
                }
                _ = ticker.tick() => {
                    self.poll_subscriptions(None).await;
                }
            }
        }

        log::info!("Command channel closed; backend stopping");
        Ok(())
    }

    async fn handle_command(&mut self, command: BackendCommand) {
        match command {
            BackendCommand::AddAuthListener => {
                self.auth_listening = true;
                let user = self.current_user.clone();
                self.emit(BackendEvent::AuthChanged(user)).await;
            }
            BackendCommand::RemoveAuthListener => {
                self.auth_listening = false;
            }
            BackendCommand::SignIn(credentials) => self.sign_in(credentials).await,
            BackendCommand::SignOut => self.sign_out().await,
            BackendCommand::Subscribe { subscription, path } => {
                if self.subscriptions.contains_key(&subscription) {
                    log::debug!("Subscription {subscription} already registered");
                    return;
                }
                let existing = self.feed.count(&path).unwrap_or_default();
                log::info!("Subscribing {subscription} to `{path}` ({existing} children)");
                self.subscriptions
                    .insert(subscription, FeedCursor::new(path));
                self.poll_subscription(subscription).await;
            }
            BackendCommand::Unsubscribe { subscription } => {
                if self.subscriptions.remove(&subscription).is_some() {
                    log::info!("Unsubscribed {subscription}");
                }
            }
            BackendCommand::Push { path, record } => self.push(path, record).await,
            BackendCommand::Upload { source } => self.spawn_upload(source),
        }
    }

    async fn sign_in(&mut self, credentials: Credentials) {
        let user = User {
            uid: Uuid::new_v4().to_string(),
            display_name: credentials.display_name,
            provider: credentials.provider,
            email: credentials.email,
        };

        let saved = self.identity.save(&user);
        if let Err(err) = saved {
            log::warn!("Failed to persist identity: {err}");
            self.emit(BackendEvent::Failed(Failure::new(
                Operation::SignIn,
                err.to_string(),
            )))
            .await;
            return;
        }

        log::info!(
            "Signed in {} via {}",
            user.display_name,
            user.provider
        );
        self.current_user = Some(user);
        self.notify_auth_listener().await;
    }

    async fn sign_out(&mut self) {
        let cleared = self.identity.clear();
        if let Err(err) = cleared {
            log::warn!("Failed to clear identity: {err}");
            self.emit(BackendEvent::Failed(Failure::new(
                Operation::SignOut,
                err.to_string(),
            )))
            .await;
            return;
        }

        if let Some(user) = self.current_user.take() {
            log::info!("Signed out {}", user.display_name);
        }
        self.notify_auth_listener().await;
    }

    async fn notify_auth_listener(&mut self) {
        if self.auth_listening {
            let user = self.current_user.clone();
            self.emit(BackendEvent::AuthChanged(user)).await;
        }
    }

    async fn push(&mut self, path: String, record: MessageRecord) {
        let stored = serde_json::to_string(&record)
            .map_err(ChatError::from)
            .and_then(|value| Ok(self.feed.push(&path, &value)?));

        match stored {
            Ok(row) => {
                log::debug!("Appended {} to `{path}` at seq {}", row.key, row.seq);
                self.poll_subscriptions(Some(&path)).await;
            }
            Err(err) => {
                log::warn!("Failed to append to `{path}`: {err}");
                self.emit(BackendEvent::Failed(Failure::new(
                    Operation::Push,
                    err.to_string(),
                )))
                .await;
            }
        }
    }

    fn spawn_upload(&self, source: PathBuf) {
        let blobs = self.blobs.clone();
        let folder = self.photos_path.clone();
        let event_sender = self.event_sender.clone();

        tokio::spawn(async move {
            let event = match blobs.upload(&folder, &source).await {
                Ok(url) => {
                    log::info!("Uploaded {} to {url}", source.display());
                    BackendEvent::UploadCompleted { url }
                }
                Err(err) => {
                    log::warn!("Upload of {} failed: {err}", source.display());
                    BackendEvent::Failed(Failure::new(Operation::Upload, err.to_string()))
                }
            };
            if let Err(err) = event_sender.send(event).await {
                log::warn!("Failed to report upload result to UI: {err}");
            }
        });
    }

    /// Poll every subscription, or only those on `path`.
    async fn poll_subscriptions(&mut self, path: Option<&str>) {
        let ids: Vec<SubscriptionId> = self
            .subscriptions
            .iter()
            .filter(|(_, cursor)| path.is_none_or(|path| cursor.path() == path))
            .map(|(id, _)| *id)
            .collect();

        for id in ids {
            self.poll_subscription(id).await;
        }
    }

    async fn poll_subscription(&mut self, subscription: SubscriptionId) {
        let Some(cursor) = self.subscriptions.get_mut(&subscription) else {
            return;
        };

        let events = match cursor.sync(&self.feed) {
            Ok(events) => events,
            Err(err) => {
                log::warn!("Cancelling {subscription}: {err}");
                self.subscriptions.remove(&subscription);
                vec![FeedEvent::Cancelled {
                    reason: err.to_string(),
                }]
            }
        };

        for event in events {
            self.emit(BackendEvent::Feed {
                subscription,
                event,
            })
            .await;
        }
    }

    async fn emit(&mut self, event: BackendEvent) {
        if let Err(err) = self.event_sender.send(event).await {
            log::warn!("Failed to deliver backend event to UI: {err}");
        }
    }
}
