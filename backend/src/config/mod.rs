//! Startup configuration: typed settings and the token signing secret.

pub mod auth_secret;
pub mod settings;

pub use auth_secret::{AuthSecretConfigError, BuildMode, auth_secret_from_env};
pub use settings::{AppSettings, SettingsError};
