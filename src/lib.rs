pub mod accounts;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod health;
pub mod images;
pub mod profile;
pub mod state;
pub mod storage;

pub use app::{build_app, serve};
pub use state::AppState;
