use crate::common::{BackendCommand, SubscriptionId};

/// Tracks the single feed subscription held by the screen.
///
/// Activation and deactivation are idempotent: a second `activate` while a
/// subscription is live returns no command.
#[derive(Debug, Default)]
pub struct FeedListener {
    next_id: u64,
    active: Option<SubscriptionId>,
    subscribe_count: usize,
}

impl FeedListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self, path: &str) -> Option<BackendCommand> {
        if self.active.is_some() {
            return None;
        }

        self.next_id += 1;
        let subscription = SubscriptionId(self.next_id);
        self.active = Some(subscription);
        self.subscribe_count += 1;
        log::debug!(
            "Attaching feed listener {subscription} to `{path}` (attach #{})",
            self.subscribe_count
        );

        Some(BackendCommand::Subscribe {
            subscription,
            path: path.to_string(),
        })
    }

    pub fn deactivate(&mut self) -> Option<BackendCommand> {
        let subscription = self.active.take()?;
        log::debug!("Detaching feed listener {subscription}");
        Some(BackendCommand::Unsubscribe { subscription })
    }

    /// Forget a subscription the backend has already dropped.
    pub fn cancelled(&mut self, subscription: SubscriptionId) {
        if self.active == Some(subscription) {
            self.active = None;
        }
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Events from any other subscription are leftovers of a detached listener.
    pub fn accepts(&self, subscription: SubscriptionId) -> bool {
        self.active == Some(subscription)
    }

    /// Number of subscriptions opened over the listener's lifetime.
    #[cfg(test)]
    pub fn subscribe_count(&self) -> usize {
        self.subscribe_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_twice_subscribes_once() {
        let mut listener = FeedListener::new();
        assert!(listener.activate("messages").is_some());
        assert!(listener.activate("messages").is_none());
        assert_eq!(listener.subscribe_count(), 1);
        assert!(listener.is_active());
    }

    #[test]
    fn deactivate_when_inactive_is_noop() {
        let mut listener = FeedListener::new();
        assert!(listener.deactivate().is_none());
    }

    #[test]
    fn reactivation_uses_a_fresh_handle() {
        let mut listener = FeedListener::new();
        let first = match listener.activate("messages") {
            Some(BackendCommand::Subscribe { subscription, .. }) => subscription,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(
            listener.deactivate(),
            Some(BackendCommand::Unsubscribe {
                subscription: first
            })
        );
        listener.activate("messages");

        assert!(!listener.accepts(first));
        assert_eq!(listener.subscribe_count(), 2);
    }

    #[test]
    fn cancellation_releases_only_the_matching_handle() {
        let mut listener = FeedListener::new();
        listener.activate("messages");
        listener.cancelled(SubscriptionId(99));
        assert!(listener.is_active());

        listener.cancelled(SubscriptionId(1));
        assert!(!listener.is_active());
    }
}
