use std::{fmt, sync::Arc};

use openssl::{
    ec::EcKey,
    ecdsa::EcdsaSig,
    hash::{hash, MessageDigest},
    pkey::{PKey, Private},
};
use ring::signature::EcdsaKeyPair;

use crate::{
    error,
    jwa::ec::{Curve, PublicKey, SigningAlgorithm},
    jws,
};

/// ECC private key parameters
#[derive(Clone)]
#[must_use]
pub struct PrivateKey {
    public_key: PublicKey,
    pkcs8: Vec<u8>,
    signing_key: SigningKey,
}

// ring has no P-521 support, so ES512 signing goes through OpenSSL.
#[derive(Clone)]
enum SigningKey {
    Ring(Arc<EcdsaKeyPair>),
    OpenSsl(EcKey<Private>),
}

impl SigningKey {
    fn from_pkcs8(
        alg: &'static ring::signature::EcdsaSigningAlgorithm,
        pkcs8: &[u8],
    ) -> Result<Self, error::KeyRejected> {
        let pair = EcdsaKeyPair::from_pkcs8(alg, pkcs8, &ring::rand::SystemRandom::new())
            .map_err(|e| error::key_rejected(e.to_string()))?;

        Ok(Self::Ring(Arc::new(pair)))
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.pkcs8 == other.pkcs8
    }
}

impl Eq for PrivateKey {}

impl PrivateKey {
    /// Generates a new ECC key pair using the specified curve
    ///
    /// # Errors
    ///
    /// Unable to generate a private key.
    pub fn generate(curve: Curve) -> Result<Self, error::Unexpected> {
        let key = EcKey::generate(curve.to_group()).map_err(error::unexpected)?;

        Self::from_openssl_eckey(key).map_err(error::unexpected)
    }

    /// Constructs an ECC key pair from a PEM file
    ///
    /// # Errors
    ///
    /// The provided PEM file is not a valid ECC private key.
    pub fn from_pem(pem: &str) -> Result<Self, error::KeyRejected> {
        let key = PKey::private_key_from_pem(pem.as_bytes()).map_err(error::key_rejected)?;
        Self::from_openssl_eckey(key.ec_key().map_err(error::key_rejected)?)
    }

    fn from_openssl_eckey(key: EcKey<Private>) -> Result<Self, error::KeyRejected> {
        let public_key = PublicKey::from_openssl_eckey(&*key)?;

        let pkey = PKey::from_ec_key(key.clone()).map_err(error::key_rejected)?;
        let pkcs8 = pkey.private_key_to_pkcs8().map_err(error::key_rejected)?;

        let signing_key = match public_key.curve() {
            Curve::P256 => SigningKey::from_pkcs8(
                &ring::signature::ECDSA_P256_SHA256_FIXED_SIGNING,
                &pkcs8,
            )?,
            Curve::P384 => SigningKey::from_pkcs8(
                &ring::signature::ECDSA_P384_SHA384_FIXED_SIGNING,
                &pkcs8,
            )?,
            Curve::P521 => SigningKey::OpenSsl(key),
        };

        Ok(Self {
            public_key,
            pkcs8,
            signing_key,
        })
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn to_pem(&self) -> Result<String, error::Unexpected> {
        let x = PKey::private_key_from_pkcs8(&self.pkcs8)
            .map_err(error::unexpected)?
            .private_key_to_pem_pkcs8()
            .map_err(error::unexpected)?;
        String::from_utf8(x).map_err(error::unexpected)
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

impl jws::Signer for PrivateKey {
    type Algorithm = SigningAlgorithm;
    type Error = error::SigningError;

    fn can_sign(&self, alg: Self::Algorithm) -> bool {
        self.public_key.curve() == Curve::from(alg)
    }

    fn sign(&self, alg: Self::Algorithm, data: &[u8]) -> Result<Vec<u8>, Self::Error> {
        if !self.can_sign(alg) {
            return Err(error::incompatible_algorithm(alg).into());
        }

        let signature = match &self.signing_key {
            SigningKey::Ring(pair) => pair
                .sign(&ring::rand::SystemRandom::new(), data)
                .map_err(|e| error::unexpected(e.to_string()))?
                .as_ref()
                .to_owned(),
            SigningKey::OpenSsl(key) => {
                let digest = hash(MessageDigest::sha512(), data).map_err(error::unexpected)?;
                let sig = EcdsaSig::sign(&digest, key).map_err(error::unexpected)?;

                let width = Curve::P521.coordinate_size() as i32;
                let mut out = sig.r().to_vec_padded(width).map_err(error::unexpected)?;
                out.extend_from_slice(&sig.s().to_vec_padded(width).map_err(error::unexpected)?);
                out
            }
        };

        debug_assert_eq!(signature.len(), alg.signature_size());

        Ok(signature)
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
