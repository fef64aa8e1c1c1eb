//! Data Transfer Objects
//!
//! Wire shapes exchanged with the systems around the pipeline. DTOs are
//! converted into domain types before a provider sees them.

pub mod deployment;
