use std::path::PathBuf;

use crate::common::{BackendCommand, Credentials};

use super::{Effect, Notice, Session};

/// How an interactive flow launched by the screen ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Confirmed(T),
    Cancelled,
}

/// Result of a flow the screen launched and waits on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenResult {
    SignIn(Outcome<Credentials>),
    PhotoPicker(Outcome<PathBuf>),
}

impl Session {
    /// Every request kind and outcome gets exactly one arm.
    pub(super) fn on_screen_result(&mut self, result: ScreenResult) -> Vec<Effect> {
        match result {
            ScreenResult::SignIn(Outcome::Confirmed(credentials)) => {
                log::info!(
                    "Sign-in confirmed for {} via {}",
                    credentials.display_name,
                    credentials.provider
                );
                vec![
                    Effect::Notice(Notice::long("Welcome to the Chat App!")),
                    Effect::Command(BackendCommand::SignIn(credentials)),
                ]
            }
            ScreenResult::SignIn(Outcome::Cancelled) => {
                log::info!("Sign-in cancelled; closing");
                vec![
                    Effect::Notice(Notice::short("Sign-in Cancelled!")),
                    Effect::CloseScreen,
                ]
            }
            ScreenResult::PhotoPicker(Outcome::Confirmed(source)) => {
                log::info!("Uploading {}", source.display());
                self.uploads_in_flight += 1;
                vec![Effect::Command(BackendCommand::Upload { source })]
            }
            ScreenResult::PhotoPicker(Outcome::Cancelled) => {
                log::debug!("Photo picker dismissed");
                Vec::new()
            }
        }
    }
}
