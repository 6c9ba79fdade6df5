use openssl::{
    bn::{BigNum, BigNumContext},
    ec::{EcKey, EcKeyRef},
    ecdsa::EcdsaSig,
    hash::{hash, MessageDigest},
    pkey::{HasPublic, PKey, Public},
};

use crate::{
    b64::{Base64Url, Base64UrlRef},
    error,
    jwa::ec::{Curve, SigningAlgorithm},
    jws,
};

/// ECC public key components
#[derive(Debug, Clone, Eq, PartialEq)]
#[must_use]
pub struct PublicKey {
    curve: Curve,
    x: Base64Url,
    y: Base64Url,
}

impl PublicKey {
    /// The curve the key belongs to
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// The affine x-coordinate, zero-padded to the width of the curve field
    pub fn x_coordinate(&self) -> &Base64UrlRef {
        &self.x
    }

    /// The affine y-coordinate, zero-padded to the width of the curve field
    pub fn y_coordinate(&self) -> &Base64UrlRef {
        &self.y
    }

    /// Constructs an ECC public key from a PEM file
    ///
    /// # Errors
    ///
    /// The provided PEM file is not a valid ECC public key.
    pub fn from_pem(pem: &str) -> Result<Self, error::KeyRejected> {
        let key = PKey::public_key_from_pem(pem.as_bytes()).map_err(error::key_rejected)?;
        let key = key.ec_key().map_err(error::key_rejected)?;
        Self::from_openssl_eckey(&key)
    }

    /// Constructs an ECC public key from the curve and affine coordinates
    ///
    /// # Errors
    ///
    /// The coordinates do not name a point on the specified curve.
    pub fn from_components(
        curve: Curve,
        x: impl AsRef<[u8]>,
        y: impl AsRef<[u8]>,
    ) -> Result<Self, error::KeyRejected> {
        let x = BigNum::from_slice(x.as_ref()).map_err(error::key_rejected)?;
        let y = BigNum::from_slice(y.as_ref()).map_err(error::key_rejected)?;

        let key = EcKey::from_public_key_affine_coordinates(curve.to_group(), &x, &y)
            .map_err(error::key_rejected)?;

        Self::from_openssl_eckey(&key)
    }

    pub(crate) fn from_openssl_eckey<T: HasPublic>(
        key: &EcKeyRef<T>,
    ) -> Result<Self, error::KeyRejected> {
        let group = key.group();
        let curve =
            Curve::from_group(group).ok_or_else(|| error::key_rejected("unsupported curve"))?;

        let mut ctx = BigNumContext::new().map_err(error::key_rejected)?;
        let mut x = BigNum::new().map_err(error::key_rejected)?;
        let mut y = BigNum::new().map_err(error::key_rejected)?;

        key.public_key()
            .affine_coordinates_gfp(group, &mut x, &mut y, &mut ctx)
            .map_err(error::key_rejected)?;

        let width = curve.coordinate_size() as i32;

        Ok(Self {
            curve,
            x: Base64Url::from_raw(x.to_vec_padded(width).map_err(error::key_rejected)?),
            y: Base64Url::from_raw(y.to_vec_padded(width).map_err(error::key_rejected)?),
        })
    }

    /// Exports the public key as a PEM
    ///
    /// # Errors
    ///
    /// Unable to reconstruct the key from its components.
    pub fn to_pem(&self) -> Result<String, error::Unexpected> {
        let key = self.to_openssl_eckey()?;
        let pem = key.public_key_to_pem().map_err(error::unexpected)?;
        String::from_utf8(pem).map_err(error::unexpected)
    }

    fn to_openssl_eckey(&self) -> Result<EcKey<Public>, error::Unexpected> {
        let x = BigNum::from_slice(self.x.as_slice()).map_err(error::unexpected)?;
        let y = BigNum::from_slice(self.y.as_slice()).map_err(error::unexpected)?;

        EcKey::from_public_key_affine_coordinates(self.curve.to_group(), &x, &y)
            .map_err(error::unexpected)
    }

    // SEC 1 uncompressed point form, as expected by ring
    fn uncompressed_point(&self) -> Vec<u8> {
        let x = self.x.as_slice();
        let y = self.y.as_slice();

        let mut point = Vec::with_capacity(1 + x.len() + y.len());
        point.push(0x04);
        point.extend_from_slice(x);
        point.extend_from_slice(y);
        point
    }

    fn verify_ring(
        &self,
        alg: &'static ring::signature::EcdsaVerificationAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), error::KeyVerifyError> {
        let key = ring::signature::UnparsedPublicKey::new(alg, self.uncompressed_point());
        key.verify(data, signature)
            .map_err(|_| error::signature_mismatch())?;

        Ok(())
    }

    fn verify_openssl(&self, data: &[u8], signature: &[u8]) -> Result<(), error::KeyVerifyError> {
        let width = self.curve.coordinate_size();
        if signature.len() != 2 * width {
            return Err(error::signature_mismatch().into());
        }

        let (r, s) = signature.split_at(width);
        let sig = EcdsaSig::from_private_components(
            BigNum::from_slice(r).map_err(error::unexpected)?,
            BigNum::from_slice(s).map_err(error::unexpected)?,
        )
        .map_err(error::unexpected)?;

        let digest = hash(MessageDigest::sha512(), data).map_err(error::unexpected)?;
        let key = self.to_openssl_eckey()?;

        match sig.verify(&digest, &key) {
            Ok(true) => Ok(()),
            Ok(false) => Err(error::signature_mismatch().into()),
            Err(err) => Err(error::unexpected(err).into()),
        }
    }
}

impl jws::Verifier for PublicKey {
    type Algorithm = SigningAlgorithm;
    type Error = error::KeyVerifyError;

    fn can_verify(&self, alg: Self::Algorithm) -> bool {
        self.curve == Curve::from(alg)
    }

    fn verify(
        &self,
        alg: Self::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error> {
        match alg {
            SigningAlgorithm::ES256 => {
                self.verify_ring(&ring::signature::ECDSA_P256_SHA256_FIXED, data, signature)
            }
            SigningAlgorithm::ES384 => {
                self.verify_ring(&ring::signature::ECDSA_P384_SHA384_FIXED, data, signature)
            }
            SigningAlgorithm::ES512 => self.verify_openssl(data, signature),
        }
    }
}
