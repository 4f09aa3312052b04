//! Collection signing.
//!
//! The envelope shape (collection + signature + certificate identity) is part
//! of the wire format; the cryptography itself sits behind the
//! [`CollectionSigner`] trait. The shipped implementation signs the collection
//! as a JWS with the certificate chain embedded in the header.

mod jws;

pub use jws::JwsSigner;

use crate::Result;
use crate::model::{Collection, SignedCollection};

/// Produces a signed envelope for a finished collection.
pub trait CollectionSigner {
    /// Sign `collection`, returning the signed envelope.
    fn sign(&self, collection: &Collection) -> Result<SignedCollection>;
}
