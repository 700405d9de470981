//! Form definitions and validation for StudyHub.
//!
//! This crate defines the request forms accepted at the web boundary, the
//! [`Errors`] collector that validators report field errors into, the
//! validators themselves, and the view types returned to clients.

mod error;
mod requests;
mod responses;
mod validator;

pub use error::*;
pub use requests::*;
pub use responses::*;
pub use validator::*;
