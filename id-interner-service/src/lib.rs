pub mod app;
pub mod handlers;
pub mod resolver;
pub mod wire;

pub use app::{build_router, AppState};
pub use resolver::IdResolver;
