//! Core types for Sokoni.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod phone;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use phone::{PhoneError, PhoneNumber};
