// Business Registry Toolkit - Core Library
// Exposes all modules for use in the loader CLI, the lookup server, and tests

pub mod cache;
pub mod config;
pub mod db;
pub mod documents;
pub mod entities;
pub mod loader;
#[cfg(feature = "server")]
pub mod registry;
pub mod xlsx;

// Re-export commonly used types
pub use cache::CacheStore;
pub use config::Config;
pub use db::{
    count_rows, insert_bankrupt, insert_businesses, insert_invalid_registration,
    insert_wrong_address, setup_database,
};
pub use entities::{Business, BusinessBankrupt, BusinessInvalidRegistration, BusinessWrongAddress};
pub use loader::{
    decode_bankrupt, decode_businesses, decode_invalid_registration, decode_wrong_address,
    import_bankrupt, import_businesses, import_invalid_registration, import_wrong_address,
    BANKRUPT_FILE, INVALID_REGISTRATION_FILE, WRONG_ADDRESS_FILE,
};
#[cfg(feature = "server")]
pub use registry::{lookup, RegistryClient};
pub use xlsx::{RowError, SheetTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
