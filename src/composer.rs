use crate::config::DEFAULT_MSG_LENGTH_LIMIT;

/// Text input of the message bar.
///
/// The text never exceeds `limit` characters and `can_send` is recomputed
/// after every change.
#[derive(Debug)]
pub struct Composer {
    text: String,
    limit: usize,
    can_send: bool,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(DEFAULT_MSG_LENGTH_LIMIT)
    }
}

impl Composer {
    pub fn new(limit: usize) -> Self {
        Self {
            text: String::new(),
            limit,
            can_send: false,
        }
    }

    #[cfg(test)]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn can_send(&self) -> bool {
        self.can_send
    }

    #[cfg(test)]
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.on_changed();
    }

    /// Direct access for the text widget; call `on_changed` after editing.
    pub fn buffer_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub fn on_changed(&mut self) {
        if let Some((cut, _)) = self.text.char_indices().nth(self.limit) {
            self.text.truncate(cut);
        }
        self.can_send = !self.text.trim().is_empty();
    }

    /// Take the raw text for sending and clear the input. Returns `None` when
    /// there is nothing to send.
    pub fn submit(&mut self) -> Option<String> {
        if !self.can_send {
            return None;
        }
        let text = std::mem::take(&mut self.text);
        self.on_changed();
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_enabled_only_for_non_blank_text() {
        let mut composer = Composer::default();
        assert!(!composer.can_send());

        for blank in ["", " ", "\t\n", "   \u{3000}"] {
            composer.set_text(blank);
            assert!(!composer.can_send(), "{blank:?} should not be sendable");
        }

        for text in ["a", "  hi  ", "\nx"] {
            composer.set_text(text);
            assert!(composer.can_send(), "{text:?} should be sendable");
        }
    }

    #[test]
    fn long_paste_is_truncated_to_limit() {
        let mut composer = Composer::default();
        composer.set_text("x".repeat(5000));
        assert_eq!(composer.text().chars().count(), DEFAULT_MSG_LENGTH_LIMIT);
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let mut composer = Composer::new(3);
        composer.set_text("héllo");
        assert_eq!(composer.text(), "hél");
    }

    #[test]
    fn edits_through_buffer_are_clamped() {
        let mut composer = Composer::new(4);
        composer.buffer_mut().push_str("abcdef");
        composer.on_changed();
        assert_eq!(composer.text(), "abcd");
        assert!(composer.can_send());
    }

    #[test]
    fn submit_returns_raw_text_and_clears() {
        let mut composer = Composer::default();
        composer.set_text("  hello ");
        assert_eq!(composer.submit().as_deref(), Some("  hello "));
        assert_eq!(composer.text(), "");
        assert!(!composer.can_send());
    }

    #[test]
    fn submit_of_blank_text_keeps_input() {
        let mut composer = Composer::default();
        composer.set_text("   ");
        assert_eq!(composer.submit(), None);
        assert_eq!(composer.text(), "   ");
    }
}
