//! collection-gen crate
//!
//! This crate is an implementation detail of the `collection-gen` tool. This crate's API is fluid and may change
//! without warning and in a semver-incompatible way.

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod generate;

#[doc(hidden)]
pub mod inspect;

#[doc(hidden)]
pub mod metadata;

#[doc(hidden)]
pub mod model;

#[doc(hidden)]
pub mod signing;

#[doc(hidden)]
pub mod validation;

#[doc(hidden)]
pub mod vcs;
