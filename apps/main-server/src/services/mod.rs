//! Business operations invoked by the API handlers.

mod account;
mod event;
mod study;
mod zone;

pub use account::*;
pub use event::*;
pub use study::*;
pub use zone::*;

/// Attempts made to commit a versioned change before giving up.
pub const MAX_UPDATE_ATTEMPTS: usize = 3;
