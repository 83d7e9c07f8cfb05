//! Provider-facing configuration (data) and pluggable behavior.
//!
//! `config` resolves raw [`ProviderSettings`] into an immutable [`ProviderConfig`], filling
//! unset endpoints with ownCloud's well-known paths on `http://localhost`. `decoder` holds
//! the ordered token-response decoders, `identity` the identifier formatting hook, and
//! `profile` the OCS profile payload shape.

pub mod config;
pub mod decoder;
pub mod identity;
pub mod profile;

pub use config::*;
pub use decoder::*;
pub use identity::*;
pub use profile::*;
