//! Core entity definitions for StudyHub.
//!
//! This crate defines the domain types shared across the StudyHub
//! workspace: accounts with their interest tags and zones, studies, and
//! study events with their enrollments.

mod account;
mod enrollment;
mod event;
mod study;
mod tag;
mod zone;

pub use account::*;
pub use enrollment::*;
pub use event::*;
pub use study::*;
pub use tag::*;
pub use zone::*;
