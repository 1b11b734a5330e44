pub mod header;
pub mod supplier;

pub use header::CredentialHeaderKind;
pub use supplier::{MetadataTokenSupplier, TokenSupplier, TokenSupplyError};
