pub mod assets;
pub mod config;
pub mod engine;
pub mod error;
pub mod fs;
pub mod http;
pub mod routes;
pub mod state;
pub mod templates;

pub use config::{EngineConfig, parse_host_port};
pub use engine::Engine;
pub use state::{AppState, CurrentDatabase};
