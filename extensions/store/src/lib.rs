// # Legacy Clock Store
//
// Key-value backends for the `KeyValueStore` capability.
// The engine only ever sees the trait; pick a backend per deployment.

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traced;

// Re-exports for convenience
pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
pub use traced::Traced;

// Prelude module
pub mod prelude {
    pub use crate::file::FileStore;
    pub use crate::memory::MemoryStore;
    #[cfg(feature = "sqlite")]
    pub use crate::sqlite::SqliteStore;
    pub use crate::traced::Traced;
    pub use legacy_clock_core::capability::KeyValueStore;
}
