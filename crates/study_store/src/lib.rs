//! Storage for StudyHub.
//!
//! This crate provides the persistence abstraction used by the server for
//! accounts, tags, zones, studies and events, together with an in-memory
//! implementation.

mod error;
mod memory;
mod traits;

pub use error::*;
pub use memory::*;
pub use traits::*;
