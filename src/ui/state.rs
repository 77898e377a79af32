use std::time::{Duration, Instant};

use crate::composer::Composer;
use crate::session::{Notice, Session};

use super::components::sign_in::SignInForm;
use super::images::ImageCache;

/// Notice currently on screen.
#[derive(Debug, Clone)]
pub struct ActiveNotice {
    pub text: String,
    pub expires_at: Instant,
}

/// Trạng thái cục bộ của UI.
pub struct AppState {
    pub session: Session,
    pub composer: Composer,
    pub notices: Vec<ActiveNotice>,
    /// Open while the interactive sign-in flow is running.
    pub sign_in: Option<SignInForm>,
    pub images: ImageCache,
    /// Whether the window was last seen restored (not minimized).
    pub foreground: bool,
}

impl AppState {
    pub fn new(session: Session, composer: Composer) -> Self {
        Self {
            session,
            composer,
            notices: Vec::new(),
            sign_in: None,
            images: ImageCache::default(),
            foreground: false,
        }
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(ActiveNotice {
            text: notice.text,
            expires_at: Instant::now() + notice.duration,
        });

        // Giữ tối đa vài thông báo để không che màn hình
        if self.notices.len() > 4 {
            self.notices.remove(0);
        }
    }

    /// Drop expired notices; returns how long until the next one expires.
    pub fn expire_notices(&mut self, now: Instant) -> Option<Duration> {
        self.notices.retain(|notice| notice.expires_at > now);
        self.notices
            .iter()
            .map(|notice| notice.expires_at - now)
            .min()
    }
}
