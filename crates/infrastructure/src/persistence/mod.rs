//! Session persistence on disk.

mod file_storage;

pub use file_storage::FileSessionStorage;
