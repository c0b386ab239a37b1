//! Signing key configuration for bearer tokens and entity tags.
//!
//! Both deployables must load the same secret: tokens issued by
//! `cinema-users` are verified by `cinema-app`, and entity tags are signed
//! and checked with the same key.

use std::path::PathBuf;

use mockable::Env;
use rand::RngCore;
use tracing::{debug, warn};
use zeroize::Zeroizing;

const KEY_DEFAULT_PATH: &str = "/var/run/secrets/jwt_key";
const KEY_FILE_ENV: &str = "CINEMA_JWT_KEY_FILE";
const ALLOW_EPHEMERAL_ENV: &str = "CINEMA_ALLOW_EPHEMERAL_KEY";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const EPHEMERAL_KEY_LEN: usize = 64;

/// Shortest key accepted by release builds.
pub const SIGNING_KEY_MIN_LEN: usize = 32;

/// Build mode for key configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds fall back to a random key when the file is unreadable.
    Debug,
    /// Release builds require a readable key of at least
    /// [`SIGNING_KEY_MIN_LEN`] bytes.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cinema::server::BuildMode;
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

/// HMAC secret shared by the token service and the resource signer.
///
/// The bytes are wiped when the key is dropped.
pub struct SigningKey {
    bytes: Zeroizing<Vec<u8>>,
    ephemeral: bool,
}

impl SigningKey {
    /// Wrap key material obtained elsewhere, e.g. a secret store.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
            ephemeral: false,
        }
    }

    fn random() -> Self {
        let mut bytes = Zeroizing::new(vec![0_u8; EPHEMERAL_KEY_LEN]);
        rand::thread_rng().fill_bytes(bytes.as_mut_slice());
        Self {
            bytes,
            ephemeral: true,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Whether the key was generated for this process only.
    #[must_use]
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.bytes.len())
            .field("ephemeral", &self.ephemeral)
            .finish()
    }
}

/// Errors raised while loading the signing key.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the key file failed.
    #[error("failed to read signing key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is too short for release builds.
    #[error("signing key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Release builds must not use per-process keys.
    #[error("CINEMA_ALLOW_EPHEMERAL_KEY must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Load the signing key named by `CINEMA_JWT_KEY_FILE`.
///
/// # Examples
///
/// ```rust
/// use cinema::server::{signing_key_from_env, BuildMode};
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key_path = std::env::temp_dir().join("cinema_jwt_key_example");
/// std::fs::write(&key_path, vec![b'k'; 32])?;
///
/// let key_path = key_path.to_str().expect("valid path").to_string();
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "CINEMA_JWT_KEY_FILE" => Some(key_path.clone()),
///     _ => None,
/// });
///
/// let key = signing_key_from_env(&env, BuildMode::Release)?;
/// assert_eq!(key.as_bytes().len(), 32);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Release builds fail when the file is unreadable or shorter than
/// [`SIGNING_KEY_MIN_LEN`], or when an ephemeral key is requested.
pub fn signing_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SigningKey, TokenConfigError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| KEY_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(bytes) => {
            let bytes = Zeroizing::new(bytes);
            let length = bytes.len();
            if mode == BuildMode::Release && length < SIGNING_KEY_MIN_LEN {
                return Err(TokenConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SIGNING_KEY_MIN_LEN,
                });
            }
            debug!(path = %path.display(), length, "signing key loaded");
            Ok(SigningKey {
                bytes,
                ephemeral: false,
            })
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary signing key (dev only); tokens will not verify across processes"
            );
            Ok(SigningKey::random())
        }
        Err(error) => Err(TokenConfigError::KeyRead {
            path,
            source: error,
        }),
    }
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, TokenConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(true) if mode.is_debug() => Ok(true),
        Some(true) => Err(TokenConfigError::EphemeralNotAllowed),
        Some(false) => Ok(false),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid CINEMA_ALLOW_EPHEMERAL_KEY; defaulting to disabled");
            Ok(false)
        }
        None => Err(TokenConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "token_config_tests.rs"]
mod tests;
