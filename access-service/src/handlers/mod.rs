pub mod access_tokens;
pub mod admin;
pub mod metrics;
pub mod modules;
