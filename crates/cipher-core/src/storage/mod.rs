//! Storage backends for derived keys
//!
//! The core only writes keys; where they end up is the caller's choice:
//! 1. OS Keychain
//! 2. Process environment variables
//! 3. In-memory map or an arbitrary callback

mod env;
mod keychain;
mod memory;
mod traits;

pub use env::EnvStore;
pub use keychain::{KeychainStore, DEFAULT_SERVICE};
pub use memory::{CallbackStore, MemoryStore};
pub use traits::KeyStore;
