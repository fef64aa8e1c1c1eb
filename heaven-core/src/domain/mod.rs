//! Core domain types
//!
//! The structures a provider run works with: the incoming deployment
//! request, the fetched archive, application versions on the platform and
//! the status reported back to the caller.

pub mod archive;
pub mod deployment;
pub mod status;
pub mod version;
