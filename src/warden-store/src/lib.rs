//! Warden Store - reference data access for the authorization core.
//!
//! The core only reads through [`PermissionStore`]; writes are limited to
//! creating users on first contact and recording terms acceptance.
//!
//! # Usage
//!
//! ```rust,no_run
//! use warden_policy::ExternalId;
//! use warden_store::{MemoryStore, Seed, check_access};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let seed = Seed::load("seed.toml").await?;
//!     let store = MemoryStore::from_seed(seed).await?;
//!
//!     let access = check_access(&store, ExternalId(42), "schedule").await?;
//!     println!("{access}");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod seed;
pub mod snapshot;
pub mod store;

pub use error::{SeedError, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use seed::{Seed, SeedRole, SeedUser};
pub use snapshot::{check_access, compare_users, load_snapshot, resolve_for, roles_of};
pub use store::{ACCESS_MODE_KEY, DisplayHints, PermissionStore, TERMS_TEXT_KEY, User};
