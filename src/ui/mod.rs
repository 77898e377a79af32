mod app;
mod components;
mod images;
mod state;

pub use app::ChatApp;
