//! alumnyx-common: Shared error type and HTTP plumbing used across Alumnyx crates.

pub mod error;
pub mod sandbox;

pub use error::AlumnyxError;
pub use sandbox::SandboxClient;
