pub mod app;
pub mod handlers;

pub use app::{build_router, AppState};
