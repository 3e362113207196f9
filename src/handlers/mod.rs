pub mod api;
pub mod health;

pub use api::*;
pub use health::*;

// OAuth2 handlers estão em src/auth/handlers.rs (módulo separado)
