//! ECC JSON Web Algorithm implementations
//!
//! ES256 and ES384 operations are backed by `ring`. The P-521 curve is not
//! available in `ring`, so ES512 operations are backed by OpenSSL instead.
//! All signatures use the fixed-length concatenation of `r` and `s` required
//! by JWS, with each scalar zero-padded to the full width of the curve field.

use std::{convert::TryFrom, fmt};

use once_cell::sync::Lazy;
use openssl::{
    ec::{EcGroup, EcGroupRef},
    nid::Nid,
};

use crate::error;
use crate::jws;

mod private;
mod public;

pub use private::PrivateKey;
pub use public::PublicKey;

static P256: Lazy<EcGroup> =
    Lazy::new(|| EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap());
static P384: Lazy<EcGroup> = Lazy::new(|| EcGroup::from_curve_name(Nid::SECP384R1).unwrap());
static P521: Lazy<EcGroup> = Lazy::new(|| EcGroup::from_curve_name(Nid::SECP521R1).unwrap());

/// A named ECC curve
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Curve {
    /// The P-256 curve (prime256v1/secp256r1)
    P256,

    /// The P-384 curve (secp384r1)
    P384,

    /// The P-521 curve (secp521r1)
    P521,
}

impl Curve {
    fn to_group(self) -> &'static EcGroupRef {
        match self {
            Curve::P256 => &P256,
            Curve::P384 => &P384,
            Curve::P521 => &P521,
        }
    }

    fn from_group(group: &EcGroupRef) -> Option<Self> {
        let nid = group.curve_name()?;
        if nid == P256.curve_name().unwrap() {
            Some(Curve::P256)
        } else if nid == P384.curve_name().unwrap() {
            Some(Curve::P384)
        } else if nid == P521.curve_name().unwrap() {
            Some(Curve::P521)
        } else {
            None
        }
    }

    /// The width in bytes of one zero-padded coordinate or signature scalar
    pub(crate) const fn coordinate_size(self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        };

        f.write_str(s)
    }
}

/// Elliptic curve cryptography key
#[derive(Debug, Clone, Eq, PartialEq)]
#[must_use]
pub struct EllipticCurve {
    key: MaybePrivate,
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum MaybePrivate {
    PublicAndPrivate(PrivateKey),
    PublicOnly(PublicKey),
}

impl EllipticCurve {
    /// Generates a newly minted key pair using the specified curve
    ///
    /// # Errors
    ///
    /// Unable to generate a private key.
    pub fn generate(curve: Curve) -> Result<Self, error::Unexpected> {
        let private_key = PrivateKey::generate(curve)?;

        Ok(Self::from(private_key))
    }

    /// Constructs a private key from a PEM file
    ///
    /// # Errors
    ///
    /// The provided PEM file is not a valid ECC private key.
    pub fn private_key_from_pem(pem: &str) -> Result<Self, error::KeyRejected> {
        let private_key = PrivateKey::from_pem(pem)?;

        Ok(Self::from(private_key))
    }

    /// Constructs a public key from a PEM file
    ///
    /// # Errors
    ///
    /// The provided PEM file is not a valid ECC public key.
    pub fn public_key_from_pem(pem: &str) -> Result<Self, error::KeyRejected> {
        let public_key = PublicKey::from_pem(pem)?;

        Ok(Self::from(public_key))
    }

    /// Constructs a public key from the curve and affine coordinates
    ///
    /// # Errors
    ///
    /// The coordinates do not name a point on the specified curve.
    pub fn from_public_components(
        curve: Curve,
        x: impl AsRef<[u8]>,
        y: impl AsRef<[u8]>,
    ) -> Result<Self, error::KeyRejected> {
        let public_key = PublicKey::from_components(curve, x, y)?;

        Ok(Self::from(public_key))
    }

    pub(crate) fn private_key(&self) -> Option<&PrivateKey> {
        match &self.key {
            MaybePrivate::PublicAndPrivate(p) => Some(p),
            MaybePrivate::PublicOnly(_) => None,
        }
    }

    pub(crate) fn public_key(&self) -> &PublicKey {
        match &self.key {
            MaybePrivate::PublicAndPrivate(p) => p.public_key(),
            MaybePrivate::PublicOnly(p) => p,
        }
    }

    /// Removes the private key components
    pub fn public_only(self) -> Self {
        match self.key {
            MaybePrivate::PublicAndPrivate(p) => Self::from(p.into_public_key()),
            _ => self,
        }
    }
}

/// Elliptic curve cryptography signing algorithms
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
#[non_exhaustive]
pub enum SigningAlgorithm {
    /// ECDSA using the P-256 curve and SHA-256
    ES256,
    /// ECDSA using the P-384 curve and SHA-384
    ES384,
    /// ECDSA using the P-521 curve and SHA-512
    ES512,
}

impl From<SigningAlgorithm> for jws::Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        Self::EllipticCurve(alg)
    }
}

impl TryFrom<jws::Algorithm> for SigningAlgorithm {
    type Error = error::IncompatibleAlgorithm;

    fn try_from(alg: jws::Algorithm) -> Result<Self, Self::Error> {
        match alg {
            jws::Algorithm::EllipticCurve(alg) => Ok(alg),
            _ => Err(error::incompatible_algorithm(alg)),
        }
    }
}

impl SigningAlgorithm {
    /// Size in bytes of an ECDSA signature
    pub fn signature_size(self) -> usize {
        2 * Curve::from(self).coordinate_size()
    }
}

impl From<SigningAlgorithm> for Curve {
    fn from(alg: SigningAlgorithm) -> Self {
        match alg {
            SigningAlgorithm::ES256 => Self::P256,
            SigningAlgorithm::ES384 => Self::P384,
            SigningAlgorithm::ES512 => Self::P521,
        }
    }
}

impl From<Curve> for SigningAlgorithm {
    fn from(crv: Curve) -> Self {
        match crv {
            Curve::P256 => Self::ES256,
            Curve::P384 => Self::ES384,
            Curve::P521 => Self::ES512,
        }
    }
}

impl jws::Verifier for EllipticCurve {
    type Algorithm = SigningAlgorithm;
    type Error = error::KeyVerifyError;

    fn can_verify(&self, alg: Self::Algorithm) -> bool {
        self.public_key().can_verify(alg)
    }

    fn verify(
        &self,
        alg: Self::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error> {
        self.public_key().verify(alg, data, signature)
    }
}

impl jws::Signer for EllipticCurve {
    type Algorithm = SigningAlgorithm;
    type Error = error::SigningError;

    fn can_sign(&self, alg: Self::Algorithm) -> bool {
        if let Some(p) = self.private_key() {
            p.can_sign(alg)
        } else {
            false
        }
    }

    fn sign(&self, alg: Self::Algorithm, data: &[u8]) -> Result<Vec<u8>, Self::Error> {
        if let Some(p) = self.private_key() {
            Ok(p.sign(alg, data)?)
        } else {
            Err(error::missing_private_key().into())
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
        };

        f.write_str(s)
    }
}

impl From<PublicKey> for EllipticCurve {
    fn from(key: PublicKey) -> Self {
        Self {
            key: MaybePrivate::PublicOnly(key),
        }
    }
}

impl From<PrivateKey> for EllipticCurve {
    fn from(key: PrivateKey) -> Self {
        Self {
            key: MaybePrivate::PublicAndPrivate(key),
        }
    }
}
