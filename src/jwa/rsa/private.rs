use std::{fmt, sync::Arc};

use openssl::{
    pkey::{PKey, Private},
    rsa::Rsa,
};
use ring::signature::RsaKeyPair;

use super::{PublicKey, SigningAlgorithm};
use crate::{b64::Base64Url, error, jws};

/// RSA private key components
#[derive(Clone)]
#[must_use]
pub struct PrivateKey {
    public_key: PublicKey,
    der: Vec<u8>,
    ring_cache: Arc<RsaKeyPair>,
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for PrivateKey {}

impl PrivateKey {
    /// Generates a new 2048-bit RSA key pair
    ///
    /// # Errors
    ///
    /// Unable to generate a private key.
    pub fn generate() -> Result<Self, error::Unexpected> {
        let rsa = Rsa::generate(2048).map_err(error::unexpected)?;
        Self::from_openssl_key(&rsa).map_err(error::unexpected)
    }

    /// Imports an RSA key pair from a PEM file
    ///
    /// Accepts keys in both PKCS#8 and PKCS#1 PEM encodings. Signing keys
    /// must carry a 2048-bit modulus; larger keys can only be used for
    /// verification.
    ///
    /// # Errors
    ///
    /// The provided PEM file is not a valid RSA private key with a
    /// 2048-bit modulus.
    pub fn from_pem(pem: &str) -> Result<Self, error::KeyRejected> {
        let pkey = PKey::private_key_from_pem(pem.as_bytes()).map_err(error::key_rejected)?;
        Self::from_openssl_key(&pkey.rsa().map_err(error::key_rejected)?)
    }

    fn from_openssl_key(rsa: &Rsa<Private>) -> Result<Self, error::KeyRejected> {
        let der = rsa.private_key_to_der().map_err(error::key_rejected)?;

        let public_key = PublicKey::from_components(
            Base64Url::from_raw(rsa.n().to_vec()),
            Base64Url::from_raw(rsa.e().to_vec()),
        )?;

        let ring_cache =
            Arc::new(RsaKeyPair::from_der(&der).map_err(|e| error::key_rejected(e.to_string()))?);

        // `SigningAlgorithm::signature_size` assumes a 2048-bit modulus, so
        // signing keys are held to exactly that size. Wider keys are still
        // accepted as verification-only public keys.
        if ring_cache.public().modulus_len() != 256 {
            return Err(error::key_rejected("signing key modulus must be 2048 bits"));
        }

        Ok(Self {
            public_key,
            der,
            ring_cache,
        })
    }

    /// Exports the RSA key pair as a PEM file
    #[must_use]
    pub fn to_pem(&self) -> String {
        let key = Rsa::private_key_from_der(&self.der).unwrap();
        let pem = key.private_key_to_pem().unwrap();
        String::from_utf8(pem).unwrap()
    }

    /// Provides access to the public key parameters
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Extracts the public key
    pub fn into_public_key(self) -> PublicKey {
        self.public_key
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl jws::Signer for PrivateKey {
    type Algorithm = SigningAlgorithm;
    type Error = error::Unexpected;

    fn can_sign(&self, _alg: Self::Algorithm) -> bool {
        true
    }

    fn sign(&self, alg: Self::Algorithm, data: &[u8]) -> Result<Vec<u8>, Self::Error> {
        let mut buf = vec![0; self.ring_cache.public().modulus_len()];
        self.ring_cache
            .sign(
                alg.into_signing_params(),
                &ring::rand::SystemRandom::new(),
                data,
                &mut buf,
            )
            .map_err(|e| error::unexpected(e.to_string()))?;
        Ok(buf)
    }
}
