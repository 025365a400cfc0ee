pub mod app;
pub mod dto;
pub mod gc;
pub mod handlers;
pub mod validator;

pub use app::{build_router, AppState};
pub use gc::GcPool;
