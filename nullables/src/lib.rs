//! Nullable infrastructure for deterministic testing.
//!
//! A "nullable" is a production-shaped component with its externals replaced
//! by in-memory state. Tests run the real reducer against `NullStore` and
//! assert on dumped tables.

pub mod store;

pub use store::NullStore;
