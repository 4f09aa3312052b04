//! Wire-format data model for package collections.
//!
//! These types mirror the published collection format version 1.0: the
//! user-supplied input document, the generated collection document, and the
//! signed envelope. Optional fields are skipped during serialization so the
//! distinction between an absent list and an empty list survives a
//! round-trip.

mod collection;
mod input;
mod signed;

pub use collection::{
    Collection, Compatibility, FormatVersion, LibraryType, License, Manifest, Package, Platform, PlatformVersion, Product, ProductType,
    Signer, Target, Version,
};
pub use input::{Author, CollectionInput, PackageInput};
pub use signed::{Certificate, CertificateName, SignedCollection, Signature};
