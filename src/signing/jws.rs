use crate::Result;
use crate::model::{Certificate, CertificateName, Collection, Signature, SignedCollection};
use crate::signing::CollectionSigner;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use camino::Utf8Path;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use ohno::{IntoAppError, bail};
use std::fs;
use std::sync::LazyLock;
use x509_parser::der_parser::oid::Oid;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::{FromDer, X509Certificate, X509Name};

const LOG_TARGET: &str = "   signing";

/// OID of the `userID` distinguished-name attribute.
static USER_ID_OID: LazyLock<Oid<'static>> = LazyLock::new(|| Oid::from(&[0, 9, 2342, 19_200_300, 100, 1, 1]).expect("valid OID"));

/// [`CollectionSigner`] producing a JWS over the collection payload.
///
/// The signing certificate must be first in the chain and the root last. The
/// certificate chain travels in the JWS `x5c` header; the subject and issuer of
/// the signing certificate are copied into the envelope for display.
pub struct JwsSigner {
    key: EncodingKey,
    algorithm: Algorithm,
    cert_chain: Vec<Vec<u8>>,
    certificate: Certificate,
}

impl core::fmt::Debug for JwsSigner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JwsSigner")
            .field("algorithm", &self.algorithm)
            .field("cert_chain", &self.cert_chain.len())
            .finish_non_exhaustive()
    }
}

impl JwsSigner {
    /// Load the signer from a PEM-encoded private key and a certificate chain.
    ///
    /// Certificates may be DER or PEM encoded. The key's type picks the
    /// signature algorithm: RS256 for RSA keys, ES256 for EC keys.
    pub fn from_paths(private_key_path: &Utf8Path, cert_chain_paths: &[impl AsRef<Utf8Path>]) -> Result<Self> {
        if cert_chain_paths.is_empty() {
            bail!("certificate chain cannot be empty");
        }

        let key_bytes =
            fs::read(private_key_path.as_std_path()).into_app_err_with(|| format!("unable to read private key '{private_key_path}'"))?;

        let (key, algorithm) = if let Ok(key) = EncodingKey::from_rsa_pem(&key_bytes) {
            (key, Algorithm::RS256)
        } else {
            let key = EncodingKey::from_ec_pem(&key_bytes)
                .into_app_err_with(|| format!("private key '{private_key_path}' is neither an RSA nor an EC PEM key"))?;
            (key, Algorithm::ES256)
        };

        let mut cert_chain = Vec::with_capacity(cert_chain_paths.len());
        for path in cert_chain_paths {
            cert_chain.push(read_certificate_der(path.as_ref())?);
        }

        let certificate = certificate_identity(&cert_chain[0])?;

        log::debug!(target: LOG_TARGET, "Loaded signing key ({algorithm:?}) and {} certificate(s)", cert_chain.len());

        Ok(Self {
            key,
            algorithm,
            cert_chain,
            certificate,
        })
    }
}

impl CollectionSigner for JwsSigner {
    fn sign(&self, collection: &Collection) -> Result<SignedCollection> {
        let mut header = Header::new(self.algorithm);
        header.x5c = Some(self.cert_chain.iter().map(|der| BASE64.encode(der)).collect());

        let token =
            jsonwebtoken::encode(&header, collection, &self.key).into_app_err("unable to produce the collection signature")?;

        Ok(SignedCollection {
            collection: collection.clone(),
            signature: Signature {
                signature: token,
                certificate: self.certificate.clone(),
            },
        })
    }
}

/// Read a certificate file, normalizing PEM input to DER.
fn read_certificate_der(path: &Utf8Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path.as_std_path()).into_app_err_with(|| format!("unable to read certificate '{path}'"))?;

    if bytes.starts_with(b"-----BEGIN") {
        let (_, pem) = parse_x509_pem(&bytes).into_app_err_with(|| format!("unable to parse PEM certificate '{path}'"))?;
        Ok(pem.contents)
    } else {
        Ok(bytes)
    }
}

/// Extract the subject and issuer identity from a DER-encoded certificate.
fn certificate_identity(der: &[u8]) -> Result<Certificate> {
    let (_, cert) = X509Certificate::from_der(der).into_app_err("unable to parse the signing certificate")?;

    Ok(Certificate {
        subject: certificate_name(cert.subject()),
        issuer: certificate_name(cert.issuer()),
    })
}

fn certificate_name(name: &X509Name<'_>) -> CertificateName {
    CertificateName {
        user_id: name
            .iter_by_oid(&USER_ID_OID)
            .next()
            .and_then(|attr| attr.as_str().ok())
            .map(ToString::to_string),
        common_name: name.iter_common_name().next().and_then(|attr| attr.as_str().ok()).map(ToString::to_string),
        organizational_unit: name
            .iter_organizational_unit()
            .next()
            .and_then(|attr| attr.as_str().ok())
            .map(ToString::to_string),
        organization: name
            .iter_organization()
            .next()
            .and_then(|attr| attr.as_str().ok())
            .map(ToString::to_string),
    }
}
