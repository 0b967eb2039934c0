//! Board-agnostic pin resource registry
//!
//! This crate maps a board's logical hardware roles onto physical pins and
//! brings them up in a fixed order:
//!
//! - Logical resource ids ([`resource_ids!`])
//! - Identity and configuration tables filled from static declarations
//! - One runtime context per resource, owned by the [`Registry`]
//! - The initialization sequencer ([`Registry::initialize_all`])
//! - Post-bring-up access, including an `embedded-hal` pin handle
//! - Board resource maps ([`board`])
//!
//! Hardware access goes through [`pinboard_hal::PinDriver`], so everything
//! here runs on the host against a mock driver.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod board;
pub mod handle;
pub mod registry;
pub mod resource;
pub mod table;

#[cfg(test)]
mod mock;

pub use handle::PinHandle;
pub use registry::{AccessError, InitError, LookupError, Registry};
pub use resource::ResourceId;
pub use table::{Declaration, DeclareError, ResourceTables, TableBuilder};
