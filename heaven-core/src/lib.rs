//! Heaven Core
//!
//! Core types for the Heaven deployment pipeline.
//!
//! This crate contains:
//! - Domain types: deployment requests, archives, application versions, status
//! - DTOs: the inbound deployment payload

pub mod domain;
pub mod dto;
