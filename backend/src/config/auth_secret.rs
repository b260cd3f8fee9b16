//! Token signing secret loading and validation.
//!
//! The secret is read from a file whose path comes from the environment so
//! orchestrators can mount it as a volume. Debug builds fall back to a random
//! ephemeral secret unless `AUTH_ALLOW_EPHEMERAL=0` opts out; release builds
//! insist on a real one and reject the toggle when it is enabled.

use std::path::PathBuf;

use mockable::Env;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::warn;
use zeroize::Zeroize;

use crate::domain::AuthSecret;

const AUTH_SECRET_DEFAULT_PATH: &str = "/var/run/secrets/auth_secret";
/// Minimum secret length accepted by release builds.
pub const AUTH_SECRET_MIN_LEN: usize = 32;
const SECRET_FILE_ENV: &str = "AUTH_SECRET_FILE";
const ALLOW_EPHEMERAL_ENV: &str = "AUTH_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Build mode for secret validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate missing toggles and generate ephemeral secrets.
    Debug,
    /// Release builds require an explicit secret file.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use agora_backend::config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while loading the auth secret.
#[derive(thiserror::Error, Debug)]
pub enum AuthSecretConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
        /// Accepted forms.
        expected: &'static str,
    },
    /// Reading the secret file failed.
    #[error("failed to read auth secret at {path}: {source}")]
    SecretRead {
        /// Secret file location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The secret file is too short for release builds.
    #[error("auth secret at {path} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        /// Secret file location.
        path: PathBuf,
        /// Bytes read.
        length: usize,
        /// Minimum accepted length.
        min_len: usize,
    },
    /// The secret file exists but is empty.
    #[error("auth secret at {path} is empty")]
    SecretEmpty {
        /// Secret file location.
        path: PathBuf,
    },
    /// Release builds must not allow ephemeral secrets.
    #[error("AUTH_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Load the auth secret described by the environment.
///
/// # Examples
///
/// ```rust
/// use agora_backend::config::{BuildMode, auth_secret_from_env};
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let secret_path = std::env::temp_dir().join("auth_secret_example");
/// std::fs::write(&secret_path, vec![b'k'; 32])?;
///
/// let secret_path = secret_path.to_str().expect("valid path").to_string();
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "AUTH_SECRET_FILE" => Some(secret_path.clone()),
///     "AUTH_ALLOW_EPHEMERAL" => Some("0".to_string()),
///     _ => None,
/// });
///
/// let secret = auth_secret_from_env(&env, BuildMode::Release)?;
/// assert_eq!(secret.len(), 32);
/// # Ok(())
/// # }
/// ```
pub fn auth_secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<AuthSecret, AuthSecretConfigError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let path = PathBuf::from(
        env.string(SECRET_FILE_ENV)
            .unwrap_or_else(|| AUTH_SECRET_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(bytes) => secret_from_bytes(bytes, path, mode),
        Err(error) => {
            if allow_ephemeral {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using ephemeral auth secret (dev only); tokens die with the process"
                );
                Ok(ephemeral_secret())
            } else {
                Err(AuthSecretConfigError::SecretRead {
                    path,
                    source: error,
                })
            }
        }
    }
}

fn secret_from_bytes(
    mut bytes: Vec<u8>,
    path: PathBuf,
    mode: BuildMode,
) -> Result<AuthSecret, AuthSecretConfigError> {
    let length = bytes.len();
    if length == 0 {
        return Err(AuthSecretConfigError::SecretEmpty { path });
    }
    if length < AUTH_SECRET_MIN_LEN {
        if !mode.is_debug() {
            bytes.zeroize();
            return Err(AuthSecretConfigError::SecretTooShort {
                path,
                length,
                min_len: AUTH_SECRET_MIN_LEN,
            });
        }
        warn!(
            path = %path.display(),
            length,
            "auth secret shorter than {AUTH_SECRET_MIN_LEN} bytes"
        );
    }
    Ok(AuthSecret::new(bytes))
}

fn ephemeral_secret() -> AuthSecret {
    let mut bytes = vec![0_u8; AUTH_SECRET_MIN_LEN];
    OsRng.fill_bytes(&mut bytes);
    AuthSecret::new(bytes)
}

/// Whether a missing secret file may be replaced by an ephemeral secret.
///
/// Unset defaults to the build mode: allowed in debug, refused in release.
fn allow_ephemeral_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<bool, AuthSecretConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(mode.is_debug());
    };
    match parse_bool(&value) {
        Some(true) if !mode.is_debug() => Err(AuthSecretConfigError::EphemeralNotAllowed),
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid AUTH_ALLOW_EPHEMERAL; keeping the debug default");
            Ok(true)
        }
        None => Err(AuthSecretConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
