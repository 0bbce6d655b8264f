//! forge
//!
//! Abstraction for the repository host.
//!
//! # Architecture
//!
//! The `Forge` trait defines every remote operation the workflows need:
//! branch lookup and mutation, host-side merges, pull requests and releases.
//! Commands obtain a forge through [`create_forge`] and never depend on a
//! concrete transport.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and request/response types
//! - `payload`: REST wire bodies shared by both transports
//! - [`github`]: REST implementation over HTTPS
//! - [`hub`]: Implementation that runs `hub api`
//! - [`mock`]: In-memory implementation for deterministic testing
//! - `factory`: Transport selection and checkout resolution

mod factory;
pub mod github;
pub mod hub;
pub mod mock;
mod payload;
mod traits;

pub use factory::{create_forge, repository_for_checkout, valid_transport_names, Transport};
pub use traits::*;
