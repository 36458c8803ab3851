//! Session persistence.
//!
//! This module provides:
//! - A typed store over the session storage port
//! - An in-memory storage backend

mod memory;
mod store;

pub use memory::MemorySessionStorage;
pub use store::SessionStore;
