//! Shared utilities: storage backends, lenient parsing, validation helpers

pub mod coerce;
pub mod csv_storage;
pub mod memory_storage;
pub mod validation;

pub use csv_storage::CsvStorage;
pub use memory_storage::MemoryStorage;
