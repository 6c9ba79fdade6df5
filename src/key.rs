//! Keys used to sign and verify compact JWS tokens
//!
//! A [`Key`] wraps one of the supported key families and dispatches
//! signing and verification to the family implementation, after
//! checking that the requested algorithm belongs to the family.

use std::convert::TryInto;

use crate::{
    error, jwa,
    jws::{self, Signer, Verifier},
};

/// A key used to sign or verify compact JWS tokens
#[derive(Debug, Clone, Eq, PartialEq)]
#[must_use]
pub enum Key {
    /// RSA
    Rsa(jwa::Rsa),

    /// Elliptic curve cryptography
    EllipticCurve(jwa::EllipticCurve),

    /// HMAC symmetric
    Hmac(jwa::Hmac),
}

impl Key {
    /// Strips any private key components
    pub fn public_only(self) -> Self {
        match self {
            Self::Rsa(k) => Self::Rsa(k.public_only()),
            Self::EllipticCurve(k) => Self::EllipticCurve(k.public_only()),
            Self::Hmac(_) => self,
        }
    }
}

impl From<jwa::Hmac> for Key {
    fn from(key: jwa::Hmac) -> Self {
        Self::Hmac(key)
    }
}

impl From<jwa::Rsa> for Key {
    fn from(key: jwa::Rsa) -> Self {
        Self::Rsa(key)
    }
}

impl From<jwa::rsa::PublicKey> for Key {
    fn from(key: jwa::rsa::PublicKey) -> Self {
        Self::Rsa(key.into())
    }
}

impl From<jwa::rsa::PrivateKey> for Key {
    fn from(key: jwa::rsa::PrivateKey) -> Self {
        Self::Rsa(key.into())
    }
}

impl From<jwa::EllipticCurve> for Key {
    fn from(key: jwa::EllipticCurve) -> Self {
        Self::EllipticCurve(key)
    }
}

impl From<jwa::ec::PublicKey> for Key {
    fn from(key: jwa::ec::PublicKey) -> Self {
        Self::EllipticCurve(key.into())
    }
}

impl From<jwa::ec::PrivateKey> for Key {
    fn from(key: jwa::ec::PrivateKey) -> Self {
        Self::EllipticCurve(key.into())
    }
}

impl Verifier for Key {
    type Algorithm = jws::Algorithm;
    type Error = error::KeyVerifyError;

    fn can_verify(&self, alg: Self::Algorithm) -> bool {
        match self {
            Self::Rsa(p) => {
                if let Ok(alg) = alg.try_into() {
                    p.can_verify(alg)
                } else {
                    false
                }
            }
            Self::Hmac(p) => {
                if let Ok(alg) = alg.try_into() {
                    p.can_verify(alg)
                } else {
                    false
                }
            }
            Self::EllipticCurve(p) => {
                if let Ok(alg) = alg.try_into() {
                    p.can_verify(alg)
                } else {
                    false
                }
            }
        }
    }

    fn verify(
        &self,
        alg: Self::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error> {
        match self {
            Self::Hmac(p) => p.verify(alg.try_into()?, data, signature)?,
            Self::Rsa(p) => p.verify(alg.try_into()?, data, signature)?,
            Self::EllipticCurve(p) => p.verify(alg.try_into()?, data, signature)?,
        }

        Ok(())
    }
}

impl Signer for Key {
    type Algorithm = jws::Algorithm;
    type Error = error::SigningError;

    fn can_sign(&self, alg: Self::Algorithm) -> bool {
        match self {
            Self::Rsa(p) => {
                if let Ok(alg) = alg.try_into() {
                    p.can_sign(alg)
                } else {
                    false
                }
            }
            Self::Hmac(p) => {
                if let Ok(alg) = alg.try_into() {
                    p.can_sign(alg)
                } else {
                    false
                }
            }
            Self::EllipticCurve(p) => {
                if let Ok(alg) = alg.try_into() {
                    p.can_sign(alg)
                } else {
                    false
                }
            }
        }
    }

    fn sign(&self, alg: Self::Algorithm, data: &[u8]) -> Result<Vec<u8>, Self::Error> {
        let signature = match self {
            Self::Hmac(p) => p.sign(alg.try_into()?, data)?,
            Self::Rsa(p) => p.sign(alg.try_into()?, data)?,
            Self::EllipticCurve(p) => p.sign(alg.try_into()?, data)?,
        };

        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;
    use crate::b64::Base64Url;

    fn verify_token(key: &Key, alg: jws::Algorithm, token: &str) -> Result<(), error::KeyVerifyError> {
        let (message, signature) = token.rsplit_once('.').unwrap();
        key.verify(
            alg,
            message.as_bytes(),
            Base64Url::from_encoded(signature).unwrap().as_slice(),
        )
    }

    mod ec {
        use super::*;
        use crate::test::ec::*;

        fn p256_key() -> Key {
            Key::from(jwa::ec::PublicKey::from_pem(P256_PUBLIC_KEY_PEM).unwrap())
        }

        #[test]
        fn error_verifying_rsa_alg() {
            let err = dbg!(verify_token(&p256_key(), jws::Algorithm::RS512, ES256_TOKEN)).unwrap_err();
            assert!(err.is_incompatible_alg());
        }

        #[test]
        fn error_verifying_hmac_alg() {
            let err = dbg!(verify_token(&p256_key(), jws::Algorithm::HS512, ES256_TOKEN)).unwrap_err();
            assert!(err.is_incompatible_alg());
        }

        #[test]
        fn error_using_wrong_alg_for_curve() {
            let err = dbg!(p256_key().verify(jws::Algorithm::ES384, &[], &[])).unwrap_err();
            assert!(err.is_signature_mismatch());
        }

        #[test]
        fn error_verifying_with_unrelated_key() -> Result<()> {
            let unrelated = Key::from(jwa::EllipticCurve::generate(jwa::ec::Curve::P256)?);
            let err =
                dbg!(verify_token(&unrelated, jws::Algorithm::ES256, ES256_TOKEN)).unwrap_err();
            assert!(err.is_signature_mismatch());
            Ok(())
        }

        #[test]
        fn verify_es256() -> Result<(), error::KeyVerifyError> {
            verify_token(&p256_key(), jws::Algorithm::ES256, ES256_TOKEN)
        }

        #[test]
        fn verify_es384() -> Result<(), error::KeyVerifyError> {
            let key = Key::from(jwa::ec::PublicKey::from_pem(P384_PUBLIC_KEY_PEM).unwrap());
            verify_token(&key, jws::Algorithm::ES384, ES384_TOKEN)
        }

        #[test]
        fn verify_es512() -> Result<(), error::KeyVerifyError> {
            let key = Key::from(jwa::ec::PublicKey::from_pem(P521_PUBLIC_KEY_PEM).unwrap());
            verify_token(&key, jws::Algorithm::ES512, ES512_TOKEN)
        }
    }

    mod rsa {
        use super::*;
        use crate::test::rsa::*;

        fn public_key() -> Key {
            Key::from(jwa::Rsa::public_key_from_pem(PUBLIC_KEY_PEM).unwrap())
        }

        #[test]
        fn error_verifying_ec_alg() {
            let err =
                dbg!(verify_token(&public_key(), jws::Algorithm::ES512, RS256_TOKEN)).unwrap_err();
            assert!(err.is_incompatible_alg());
        }

        #[test]
        fn error_verifying_hmac_alg() {
            let err =
                dbg!(verify_token(&public_key(), jws::Algorithm::HS512, RS256_TOKEN)).unwrap_err();
            assert!(err.is_incompatible_alg());
        }

        #[test]
        fn error_signing_without_private_key() {
            let err = dbg!(public_key().sign(jws::Algorithm::RS256, b"data")).unwrap_err();
            assert!(matches!(err, error::SigningError::MissingPrivateKey(_)));
        }

        #[test]
        fn error_importing_a_3072_bit_private_key() -> Result<()> {
            let key = openssl::rsa::Rsa::generate(3072)?;
            let pem = String::from_utf8(key.private_key_to_pem()?)?;

            dbg!(jwa::Rsa::private_key_from_pem(&pem)).unwrap_err();
            Ok(())
        }

        #[test]
        fn error_verifying_with_unrelated_key() -> Result<()> {
            let unrelated = Key::from(jwa::Rsa::generate()?);
            let err =
                dbg!(verify_token(&unrelated, jws::Algorithm::RS256, RS256_TOKEN)).unwrap_err();
            assert!(err.is_signature_mismatch());
            Ok(())
        }

        #[test]
        fn verify_rs256() -> Result<(), error::KeyVerifyError> {
            verify_token(&public_key(), jws::Algorithm::RS256, RS256_TOKEN)
        }

        #[test]
        fn verify_rs384() -> Result<(), error::KeyVerifyError> {
            verify_token(&public_key(), jws::Algorithm::RS384, RS384_TOKEN)
        }

        #[test]
        fn verify_rs512() -> Result<(), error::KeyVerifyError> {
            verify_token(&public_key(), jws::Algorithm::RS512, RS512_TOKEN)
        }

        #[test]
        fn verify_ps256() -> Result<(), error::KeyVerifyError> {
            verify_token(&public_key(), jws::Algorithm::PS256, PS256_TOKEN)
        }

        #[test]
        fn verify_ps384() -> Result<(), error::KeyVerifyError> {
            verify_token(&public_key(), jws::Algorithm::PS384, PS384_TOKEN)
        }

        #[test]
        fn verify_ps512() -> Result<(), error::KeyVerifyError> {
            verify_token(&public_key(), jws::Algorithm::PS512, PS512_TOKEN)
        }

        #[test]
        fn verify_with_a_3072_bit_public_key() -> Result<()> {
            let pkey = openssl::pkey::PKey::from_rsa(openssl::rsa::Rsa::generate(3072)?)?;
            let mut signer =
                openssl::sign::Signer::new(openssl::hash::MessageDigest::sha256(), &pkey)?;
            signer.update(b"data")?;
            let signature = signer.sign_to_vec()?;

            let key = Key::from(jwa::Rsa::public_key_from_pem(&String::from_utf8(
                pkey.public_key_to_pem()?,
            )?)?);

            key.verify(jws::Algorithm::RS256, b"data", &signature)?;
            Ok(())
        }
    }

    mod hmac {
        use super::*;
        use crate::test::hmac::*;

        #[test]
        fn error_verifying_ec_alg() {
            let key = Key::from(jwa::Hmac::new(HS256_SECRET));
            let err = dbg!(verify_token(&key, jws::Algorithm::ES512, HS256_TOKEN)).unwrap_err();
            assert!(err.is_incompatible_alg());
        }

        #[test]
        fn error_verifying_rsa_alg() {
            let key = Key::from(jwa::Hmac::new(HS256_SECRET));
            let err = dbg!(verify_token(&key, jws::Algorithm::RS512, HS256_TOKEN)).unwrap_err();
            assert!(err.is_incompatible_alg());
        }

        #[test]
        fn error_verifying_with_wrong_secret() {
            let key = Key::from(jwa::Hmac::new(b"your-257-bit-secret".to_vec()));
            let err = dbg!(verify_token(&key, jws::Algorithm::HS256, HS256_TOKEN)).unwrap_err();
            assert!(err.is_signature_mismatch());
        }

        #[test]
        fn error_signing_rsa_alg() {
            let key = Key::from(jwa::Hmac::new(HS256_SECRET));
            let err = dbg!(key.sign(jws::Algorithm::RS256, b"data")).unwrap_err();
            assert!(matches!(err, error::SigningError::IncompatibleAlgorithm(_)));
        }

        #[test]
        fn verify_hs256() -> Result<(), error::KeyVerifyError> {
            let key = Key::from(jwa::Hmac::new(HS256_SECRET));
            verify_token(&key, jws::Algorithm::HS256, HS256_TOKEN)
        }

        #[test]
        fn verify_hs384() -> Result<(), error::KeyVerifyError> {
            let key = Key::from(jwa::Hmac::new(HS384_SECRET));
            verify_token(&key, jws::Algorithm::HS384, HS384_TOKEN)
        }

        #[test]
        fn verify_hs512() -> Result<(), error::KeyVerifyError> {
            let key = Key::from(jwa::Hmac::new(HS512_SECRET));
            verify_token(&key, jws::Algorithm::HS512, HS512_TOKEN)
        }
    }
}
