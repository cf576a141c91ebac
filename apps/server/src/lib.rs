pub mod api;
pub mod broker;
pub mod config;
pub mod error;
pub mod main_lib;

pub use main_lib::{build_state, init_tracing, start_background_tasks, AppState, BackgroundTasks};
