// src/profiles/mod.rs

//! Buffer profiles: the read-only parameter table used by buffer sizing.

pub mod profile;
pub mod registry;

pub use profile::{BufferProfile, ProfileKey};
pub use registry::ProfileRegistry;
