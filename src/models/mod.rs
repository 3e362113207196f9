pub mod token;

pub use token::{TokenRecord, TokenResponse, EXPIRATION_BUFFER_SECS};
