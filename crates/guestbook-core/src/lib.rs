pub mod config;
pub mod fingerprint;
pub mod types;

pub use config::GuestbookConfig;
pub use fingerprint::{ip_hash, truncate_user_agent};
pub use types::*;
