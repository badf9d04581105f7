//! # spaceshare-auth
//!
//! Credential primitives for share links: Argon2id hashing of link
//! passwords and generation of unguessable visitor tokens.

pub mod password;
pub mod token;

pub use password::PasswordHasher;
pub use token::LinkTokenGenerator;
