pub mod agents;
pub mod error;
pub mod handlers;
pub mod init;
pub mod manager;
pub mod models;
pub mod ollama;
pub mod routes;
pub mod state;
pub mod ws;

pub use crate::state::{AiConfig, AppState};
pub use crate::manager::{ConnectionManager, ManagerConfig};
