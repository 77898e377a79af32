use std::collections::VecDeque;
use std::time::Instant;

use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{BackendCommand, BackendEvent};
use crate::composer::Composer;
use crate::session::{Effect, Notice, ScreenResult, Session, SessionInput, SessionState};

use super::components::sign_in::{self, SignInForm};
use super::components::{input_bar, message_list, notices, photo_picker};
use super::state::AppState;

pub struct ChatApp {
    state: AppState,
    command_sender: mpsc::Sender<BackendCommand>,
    event_receiver: mpsc::Receiver<BackendEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        session: Session,
        composer: Composer,
        command_sender: mpsc::Sender<BackendCommand>,
        event_receiver: mpsc::Receiver<BackendEvent>,
        startup_notice: Option<Notice>,
    ) -> Self {
        let mut state = AppState::new(session, composer);
        if let Some(notice) = startup_notice {
            state.push_notice(notice);
        }
        Self {
            state,
            command_sender,
            event_receiver,
        }
    }

    /// Feed one input through the session and carry out the effects, including
    /// inputs produced by effects (picker results).
    fn dispatch(&mut self, ctx: &egui::Context, input: SessionInput) {
        let mut queue = VecDeque::from([input]);
        while let Some(input) = queue.pop_front() {
            for effect in self.state.session.handle(input) {
                if let Some(next) = self.apply(ctx, effect) {
                    queue.push_back(next);
                }
            }
        }
    }

    fn apply(&mut self, ctx: &egui::Context, effect: Effect) -> Option<SessionInput> {
        match effect {
            Effect::Command(command) => {
                self.send_command(command);
                None
            }
            Effect::Notice(notice) => {
                self.state.push_notice(notice);
                None
            }
            Effect::LaunchSignIn { providers } => {
                if self.state.sign_in.is_none() {
                    self.state.sign_in = Some(SignInForm::new(providers));
                }
                None
            }
            Effect::LaunchPhotoPicker(request) => {
                let outcome = photo_picker::pick(&request);
                Some(SessionInput::ScreenResult(ScreenResult::PhotoPicker(outcome)))
            }
            Effect::CloseScreen => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                None
            }
        }
    }

    fn send_command(&mut self, command: BackendCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to backend: {err}");
        }
    }

    fn handle_backend_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.dispatch(ctx, SessionInput::Backend(event));
        }
    }

    /// A minimized window counts as backgrounded.
    fn track_lifecycle(&mut self, ctx: &egui::Context) {
        let minimized = ctx.input(|i| i.viewport().minimized).unwrap_or(false);
        let foreground = !minimized;
        if foreground == self.state.foreground {
            return;
        }

        self.state.foreground = foreground;
        if foreground {
            log::info!("Window restored");
            self.dispatch(ctx, SessionInput::Resumed);
        } else {
            log::info!("Window minimized");
            self.dispatch(ctx, SessionInput::Paused);
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let mut sign_out = false;
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Friendly Chat");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.menu_button("Menu", |ui| {
                        let signed_in = self.state.session.state() == SessionState::SignedIn;
                        if ui
                            .add_enabled(signed_in, egui::Button::new("Sign out"))
                            .clicked()
                        {
                            sign_out = true;
                        }
                    });
                    if self.state.session.state() == SessionState::SignedIn {
                        ui.label(self.state.session.username());
                    }
                });
            });
        });

        if sign_out {
            self.dispatch(ctx, SessionInput::SignOutSelected);
        }
    }

    fn render_sign_in(&mut self, ctx: &egui::Context) {
        let Some(form) = self.state.sign_in.as_mut() else {
            return;
        };

        if let Some(outcome) = sign_in::render(ctx, form) {
            self.state.sign_in = None;
            self.dispatch(ctx, SessionInput::ScreenResult(ScreenResult::SignIn(outcome)));
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.track_lifecycle(ctx);
        self.handle_backend_events(ctx);

        self.render_top_bar(ctx);

        let signed_in = self.state.session.state() == SessionState::SignedIn;
        let uploading = self.state.session.uploads_in_flight() > 0;
        let actions = egui::TopBottomPanel::bottom("input_bar")
            .show(ctx, |ui| {
                ui.add_space(4.0);
                let actions = input_bar::render(ui, &mut self.state.composer, signed_in, uploading);
                ui.add_space(4.0);
                actions
            })
            .inner;

        egui::CentralPanel::default().show(ctx, |ui| {
            message_list::render(ui, self.state.session.messages(), &mut self.state.images);
        });

        if let Some(text) = actions.send {
            self.dispatch(ctx, SessionInput::SendText(text));
        }
        if actions.pick_photo {
            self.dispatch(ctx, SessionInput::PickPhoto);
        }

        self.render_sign_in(ctx);

        let next_expiry = self.state.expire_notices(Instant::now());
        notices::render(ctx, &self.state.notices);
        if let Some(delay) = next_expiry {
            ctx.request_repaint_after(delay);
        }

        // Backend events arrive off the UI thread; keep polling the channel.
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
