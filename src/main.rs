mod backend;
mod common;
mod composer;
mod config;
mod error;
mod session;
mod storage;
mod ui;

use std::path::{Path, PathBuf};

use backend::BackendClient;
use clap::Parser;
use composer::Composer;
use config::AppConfig;
use dotenvy::dotenv;
use error::ChatError;
use session::{Notice, Session};
use tokio::sync::mpsc;
use ui::ChatApp;

#[derive(Parser)]
#[command(
    name = "friendly_chat",
    version,
    about = "Single-screen chat client with text and photo messages"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Override the shared data directory (feed database, photos)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Override where this client stores its signed-in identity
    #[arg(long, value_name = "FILE")]
    identity: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    // Khởi tạo Logger để debug
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    if !Path::new(&cli.config).exists() {
        if let Err(err) = config::save_config(&cli.config, &app_config) {
            log::warn!("Unable to write default config {}: {err}", cli.config);
        }
    }
    if let Some(data_dir) = cli.data_dir {
        app_config.data_dir = data_dir;
    }
    if let Some(identity) = cli.identity {
        app_config.identity_file = Some(identity);
    }

    run_client(app_config).await
}

async fn run_client(app_config: AppConfig) -> Result<(), eframe::Error> {
    // 1. Tạo các kênh giao tiếp (Channels)
    // UI -> Backend
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Backend -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    // 2. Khởi chạy Backend (Chạy ngầm)
    let startup_notice = match BackendClient::new(&app_config, event_tx, cmd_rx) {
        Ok(client) => {
            tokio::spawn(async move {
                if let Err(err) = client.run().await {
                    log::error!("Backend terminated: {err}");
                }
            });
            None
        }
        Err(err) => {
            log::error!(
                "Failed to open data directory {}: {err}",
                app_config.data_dir.display()
            );
            Some(storage_failure_notice(&app_config.data_dir, &err))
        }
    };

    // 3. Khởi chạy UI (Chạy trên Main Thread)
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(app_config.window_title.clone())
            .with_inner_size([420.0, 640.0]),
        ..Default::default()
    };
    let mut event_rx = Some(event_rx);
    let mut startup_notice = startup_notice;
    let title = app_config.window_title.clone();

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");

            log::info!(
                "Client started with data directory {}",
                app_config.data_dir.display()
            );

            let session = Session::new(app_config.feed_path.clone());
            let composer = Composer::new(app_config.max_message_length);
            Ok(Box::new(ChatApp::new(
                cc,
                session,
                composer,
                cmd_tx.clone(),
                event_receiver,
                startup_notice.take(),
            )))
        }),
    )
}

fn storage_failure_notice(data_dir: &Path, err: &ChatError) -> Notice {
    Notice::long(format!(
        "Chat unavailable: cannot open {} ({err})",
        data_dir.display()
    ))
}
