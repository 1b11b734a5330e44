pub mod claims;
pub mod credential;
pub mod events;
pub mod factory;
pub mod failure;
pub mod keys;
pub mod verifier;

pub use claims::{Claims, VerifiedIdentity};
pub use factory::build_token_verifier;
pub use failure::AuthFailure;
pub use verifier::TokenVerifier;
