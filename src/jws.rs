//! Implementations of the JSON Web Signature (JWS) standard
//!
//! The specifications for this standard can be found in [RFC7515][].
//!
//! [RFC7515]: https://tools.ietf.org/html/rfc7515

use std::{convert::TryFrom, error::Error as StdError, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error, jwa};

/// JSON Web Signature signing algorithms
///
/// This is the full set of algorithms usable for signing and verifying
/// tokens. Algorithm names resolve without regard to case, but always
/// serialize in their canonical uppercase form.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[non_exhaustive]
pub enum Algorithm {
    /// HMAC symmetric
    Hmac(jwa::hmac::SigningAlgorithm),

    /// RSA public/private key pair
    Rsa(jwa::rsa::SigningAlgorithm),

    /// Elliptic curve cryptography
    EllipticCurve(jwa::ec::SigningAlgorithm),
}

impl Algorithm {
    /// The HS256 signing algorithm
    pub const HS256: Algorithm = Self::Hmac(jwa::hmac::SigningAlgorithm::HS256);
    /// The HS384 signing algorithm
    pub const HS384: Algorithm = Self::Hmac(jwa::hmac::SigningAlgorithm::HS384);
    /// The HS512 signing algorithm
    pub const HS512: Algorithm = Self::Hmac(jwa::hmac::SigningAlgorithm::HS512);

    /// The RS256 signing algorithm
    pub const RS256: Algorithm = Self::Rsa(jwa::rsa::SigningAlgorithm::RS256);
    /// The RS384 signing algorithm
    pub const RS384: Algorithm = Self::Rsa(jwa::rsa::SigningAlgorithm::RS384);
    /// The RS512 signing algorithm
    pub const RS512: Algorithm = Self::Rsa(jwa::rsa::SigningAlgorithm::RS512);
    /// The PS256 signing algorithm
    pub const PS256: Algorithm = Self::Rsa(jwa::rsa::SigningAlgorithm::PS256);
    /// The PS384 signing algorithm
    pub const PS384: Algorithm = Self::Rsa(jwa::rsa::SigningAlgorithm::PS384);
    /// The PS512 signing algorithm
    pub const PS512: Algorithm = Self::Rsa(jwa::rsa::SigningAlgorithm::PS512);

    /// The ES256 signing algorithm
    pub const ES256: Algorithm = Self::EllipticCurve(jwa::ec::SigningAlgorithm::ES256);
    /// The ES384 signing algorithm
    pub const ES384: Algorithm = Self::EllipticCurve(jwa::ec::SigningAlgorithm::ES384);
    /// The ES512 signing algorithm
    pub const ES512: Algorithm = Self::EllipticCurve(jwa::ec::SigningAlgorithm::ES512);

    /// The expected output size of the algorithm's signature in bytes
    pub fn signature_size(self) -> usize {
        match self {
            Self::Hmac(alg) => alg.signature_size(),
            Self::Rsa(alg) => alg.signature_size(),
            Self::EllipticCurve(alg) => alg.signature_size(),
        }
    }
}

impl TryFrom<&'_ str> for Algorithm {
    type Error = error::UnknownAlgorithm;

    fn try_from(value: &'_ str) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase().as_str() {
            "ES256" => Ok(Algorithm::ES256),
            "ES384" => Ok(Algorithm::ES384),
            "ES512" => Ok(Algorithm::ES512),
            "RS256" => Ok(Algorithm::RS256),
            "RS384" => Ok(Algorithm::RS384),
            "RS512" => Ok(Algorithm::RS512),
            "PS256" => Ok(Algorithm::PS256),
            "PS384" => Ok(Algorithm::PS384),
            "PS512" => Ok(Algorithm::PS512),
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(error::unknown_algorithm(value.to_string())),
        }
    }
}

impl TryFrom<String> for Algorithm {
    type Error = error::UnknownAlgorithm;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = error::UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl From<Algorithm> for String {
    fn from(alg: Algorithm) -> Self {
        alg.to_string()
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Hmac(a) => fmt::Display::fmt(a, f),
            Self::Rsa(a) => fmt::Display::fmt(a, f),
            Self::EllipticCurve(a) => fmt::Display::fmt(a, f),
        }
    }
}

/// A JWS signer
pub trait Signer {
    /// The usable signature algorithms
    type Algorithm;

    /// The error returned on failure to sign
    type Error: fmt::Debug + fmt::Display + Sync + Send + 'static;

    /// Whether the specific algorithm provided is compatible
    /// with this signer
    fn can_sign(&self, alg: Self::Algorithm) -> bool;

    /// Attempts to sign the data provided using the specified algorithm
    fn sign(&self, alg: Self::Algorithm, data: &[u8]) -> Result<Vec<u8>, Self::Error>;
}

/// A JWS verifier
pub trait Verifier {
    /// The verifiable signature algorithms
    type Algorithm;

    /// The error returned on a failure to verify
    type Error: StdError + Send + Sync + 'static;

    /// Whether the specific algorithm provided is compatible
    /// with this verifier
    fn can_verify(&self, alg: Self::Algorithm) -> bool;

    /// Attempts to verify the data against the signature using the
    /// specified algorithm
    fn verify(
        &self,
        alg: Self::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;

    #[test]
    fn resolves_canonical_names() -> Result<()> {
        assert_eq!(Algorithm::try_from("HS256")?, Algorithm::HS256);
        assert_eq!(Algorithm::try_from("RS384")?, Algorithm::RS384);
        assert_eq!(Algorithm::try_from("PS512")?, Algorithm::PS512);
        assert_eq!(Algorithm::try_from("ES512")?, Algorithm::ES512);
        Ok(())
    }

    #[test]
    fn resolves_names_case_insensitively() -> Result<()> {
        assert_eq!(Algorithm::try_from("hs256")?, Algorithm::HS256);
        assert_eq!(Algorithm::try_from("Rs256")?, Algorithm::RS256);
        assert_eq!(Algorithm::try_from("eS384")?, Algorithm::ES384);
        assert_eq!("ps256".parse::<Algorithm>()?, Algorithm::PS256);
        Ok(())
    }

    #[test]
    fn rejects_unknown_names() {
        let err = Algorithm::try_from("none").unwrap_err();
        assert_eq!(err.to_string(), "'none' does not match supported algorithms");
        assert!(Algorithm::try_from("HS257").is_err());
        assert!(Algorithm::try_from("").is_err());
    }

    #[test]
    fn displays_canonical_uppercase() {
        assert_eq!(Algorithm::try_from("hs256").unwrap().to_string(), "HS256");
        assert_eq!(Algorithm::ES512.to_string(), "ES512");
    }

    #[test]
    fn serializes_as_canonical_string() -> Result<()> {
        let alg: Algorithm = serde_json::from_str(r#""es256""#)?;
        assert_eq!(alg, Algorithm::ES256);
        assert_eq!(serde_json::to_string(&alg)?, r#""ES256""#);
        Ok(())
    }
}
