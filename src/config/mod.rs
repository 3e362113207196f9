pub mod settings;

pub use settings::{DatabaseSettings, GhlSettings, ServerSettings, Settings};
