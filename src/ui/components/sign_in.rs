use eframe::egui;

use crate::common::{Credentials, Provider};
use crate::session::Outcome;

/// Interactive sign-in flow offering the configured providers.
#[derive(Debug, Clone)]
pub struct SignInForm {
    providers: Vec<Provider>,
    provider: Provider,
    display_name: String,
    email: String,
    error: Option<String>,
}

impl SignInForm {
    pub fn new(providers: Vec<Provider>) -> Self {
        let provider = providers.first().copied().unwrap_or(Provider::Email);
        Self {
            providers,
            provider,
            display_name: String::new(),
            email: String::new(),
            error: None,
        }
    }

    fn credentials(&self) -> Result<Credentials, String> {
        let display_name = self.display_name.trim();
        if display_name.is_empty() {
            return Err("Enter a display name".to_string());
        }

        let email = match self.provider {
            Provider::Email => {
                let email = self.email.trim();
                if !email.contains('@') {
                    return Err("Enter a valid email address".to_string());
                }
                Some(email.to_string())
            }
            Provider::Google => None,
        };

        Ok(Credentials {
            provider: self.provider,
            display_name: display_name.to_string(),
            email,
        })
    }
}

/// Show the sign-in modal. Returns the outcome once the user confirms or
/// dismisses it.
pub fn render(ctx: &egui::Context, form: &mut SignInForm) -> Option<Outcome<Credentials>> {
    let mut outcome = None;

    let modal = egui::Modal::new(egui::Id::new("sign_in")).show(ctx, |ui| {
        ui.set_width(280.0);
        ui.heading("Sign in");
        ui.separator();

        ui.horizontal(|ui| {
            for provider in form.providers.clone() {
                ui.radio_value(&mut form.provider, provider, provider.to_string());
            }
        });

        ui.label("Display name");
        ui.text_edit_singleline(&mut form.display_name);

        if form.provider == Provider::Email {
            ui.label("Email");
            ui.text_edit_singleline(&mut form.email);
        }

        if let Some(error) = &form.error {
            ui.colored_label(ui.visuals().error_fg_color, error);
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("Sign in").clicked() {
                match form.credentials() {
                    Ok(credentials) => outcome = Some(Outcome::Confirmed(credentials)),
                    Err(error) => form.error = Some(error),
                }
            }
            if ui.button("Cancel").clicked() {
                outcome = Some(Outcome::Cancelled);
            }
        });
    });

    if outcome.is_none() && modal.should_close() {
        outcome = Some(Outcome::Cancelled);
    }
    outcome
}
