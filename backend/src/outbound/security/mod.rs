//! Credential and signature adapters: argon2 password hashing, HS256 bearer
//! tokens and HS256 entity tags.

mod argon2_password_hasher;
mod jws_resource_signer;
mod jwt_token_service;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use jws_resource_signer::JwsResourceSigner;
pub use jwt_token_service::JwtTokenService;
