//! Buffers encoded as URL-safe base64 with no padding
//!
//! The compact JWS serialization transports every segment in this encoding,
//! so the codec lives here in one place. Underlying data is stored as an
//! actual byte slice. Costs of conversion between base64 and raw bytes are
//! only incurred for calls to [`from_encoded()`][Base64Url::from_encoded()]
//! or when displaying the value.
//!
//! The underlying encoding/decoding mechanism is provided by the
//! [`base64`](https://docs.rs/base64) crate.

use std::{error::Error, fmt};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// An error while decoding a value which is not properly formatted
/// base64 data
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidBase64Data {
    source: base64::DecodeError,
}

impl From<base64::DecodeError> for InvalidBase64Data {
    fn from(err: base64::DecodeError) -> Self {
        Self { source: err }
    }
}

impl fmt::Display for InvalidBase64Data {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid base64 data")
    }
}

impl Error for InvalidBase64Data {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Owned data to be encoded as URL-safe base64 (no padding)
///
/// Encoding alphabet: `A`–`Z`, `a`–`z`, `0`–`9`, `-`, `_`
///
/// Data is held in memory in its raw form. Costs of serialization
/// are only incurred when displaying the value in its base64
/// representation.
#[derive(Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
#[must_use]
pub struct Base64Url(Vec<u8>);

impl Base64Url {
    /// Creates an empty buffer
    #[inline]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a new buffer from an owned value
    ///
    /// This function has no cost for [`Vec<u8>`]. Other types incur
    /// the cost of copying into a buffer.
    ///
    /// To decode a base64-encoded buffer, use [`from_encoded()`][Self::from_encoded()].
    #[inline]
    pub fn from_raw<T: Into<Vec<u8>>>(raw: T) -> Self {
        Self(raw.into())
    }

    /// Constructs a new buffer from a base64-encoded slice
    ///
    /// This function will decode the slice into a new owned buffer.
    ///
    /// If the underlying buffer has already been decoded, then
    /// transparently wrap the buffer using [`from_raw()`][Self::from_raw()].
    pub fn from_encoded<T: AsRef<[u8]>>(enc: T) -> Result<Self, InvalidBase64Data> {
        let data = base64::engine::Engine::decode(&URL_SAFE_NO_PAD, enc)?;
        Ok(Self(data))
    }

    /// Unwraps the underlying buffer
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Calculates the expected length of the base64-encoding for a buffer of size `len`
    #[inline]
    #[must_use]
    pub const fn calc_encoded_len(len: usize) -> usize {
        let d = len / 3 * 4;
        let m = len % 3;
        if m > 0 {
            d + m + 1
        } else {
            d
        }
    }
}

impl From<Vec<u8>> for Base64Url {
    #[inline]
    fn from(buf: Vec<u8>) -> Self {
        Self(buf)
    }
}

impl From<&'_ [u8]> for Base64Url {
    #[inline]
    fn from(slice: &[u8]) -> Self {
        Self::from_raw(slice)
    }
}

impl From<&'_ Base64UrlRef> for Base64Url {
    #[inline]
    fn from(val: &Base64UrlRef) -> Self {
        Self::from(val.as_slice())
    }
}

impl From<Base64Url> for Vec<u8> {
    #[inline]
    fn from(val: Base64Url) -> Self {
        val.0
    }
}

impl std::borrow::Borrow<Base64UrlRef> for Base64Url {
    #[inline]
    fn borrow(&self) -> &Base64UrlRef {
        self
    }
}

impl std::ops::Deref for Base64Url {
    type Target = Base64UrlRef;

    #[inline]
    fn deref(&self) -> &Self::Target {
        Base64UrlRef::from_slice(self.0.as_slice())
    }
}

impl AsRef<Base64UrlRef> for Base64Url {
    #[inline]
    fn as_ref(&self) -> &Base64UrlRef {
        self
    }
}

impl Default for Base64Url {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Base64Url {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

impl fmt::Debug for Base64Url {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// Borrowed data to be encoded as URL-safe base64 (no padding)
///
/// Encoding alphabet: `A`–`Z`, `a`–`z`, `0`–`9`, `-`, `_`
///
/// Data is borrowed in its raw form. Costs of converting to base64
/// form are only incurred when displaying the value.
#[derive(Hash, PartialEq, Eq)]
#[repr(transparent)]
pub struct Base64UrlRef([u8]);

impl Base64UrlRef {
    #[allow(unsafe_code)]
    #[inline]
    /// Transparently reinterprets the slice as base64
    #[must_use]
    pub fn from_slice(raw: &[u8]) -> &Self {
        let ptr: *const [u8] = raw;

        // This type is a transparent wrapper around an `[u8]`, so this
        // transformation is safe to do.
        unsafe { &*(ptr as *const Self) }
    }

    /// Calculates the expected length of the base64-encoding of this buffer
    #[inline]
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        Base64Url::calc_encoded_len(self.as_slice().len())
    }

    /// Provides access to the underlying slice
    #[inline]
    #[must_use]
    pub const fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl ToOwned for Base64UrlRef {
    type Owned = Base64Url;

    #[inline]
    fn to_owned(&self) -> Self::Owned {
        Base64Url(self.0.to_owned())
    }
}

impl PartialEq<Base64UrlRef> for Base64Url {
    #[inline]
    fn eq(&self, other: &Base64UrlRef) -> bool {
        self.0 == &other.0
    }
}

impl PartialEq<Base64Url> for Base64UrlRef {
    #[inline]
    fn eq(&self, other: &Base64Url) -> bool {
        &self.0 == other.0.as_slice()
    }
}

impl fmt::Display for Base64UrlRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let encoded = base64::engine::Engine::encode(&URL_SAFE_NO_PAD, &self.0);
        f.write_str(&encoded)
    }
}

impl fmt::Debug for Base64UrlRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let encoded = base64::engine::Engine::encode(&URL_SAFE_NO_PAD, &self.0);
        write!(f, "`{}`", encoded)
    }
}

#[cfg(doctest)]
#[doc(hidden)]
mod doctests {
    /// Verifies that `from_slice` does not extend lifetimes
    ///
    /// ```compile_fail
    /// use sigelo::b64::Base64UrlRef;
    ///
    /// let b64 = {
    ///     let data = vec![0; 16];
    ///     Base64UrlRef::from_slice(data.as_slice())
    /// };
    ///
    /// println!("{}", b64);
    /// ```
    fn base64url_from_slice_does_not_extend_lifetimes() -> ! {
        loop {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_without_padding() {
        let data = Base64Url::from_raw(&b"your-256-bit-secret"[..]);
        assert_eq!(data.to_string(), "eW91ci0yNTYtYml0LXNlY3JldA");
    }

    #[test]
    fn decodes_url_safe_alphabet() {
        let data = Base64Url::from_encoded("8J-RiyBoZWxsbywgd29ybGQhIPCfkYs").unwrap();
        assert_eq!(data.as_slice(), "👋 hello, world! 👋".as_bytes());
    }

    #[test]
    fn rejects_padded_input() {
        let err = Base64Url::from_encoded("AAECAw==").unwrap_err();
        assert_eq!(err.to_string(), "invalid base64 data");
    }

    #[test]
    fn rejects_standard_alphabet_specials() {
        assert!(Base64Url::from_encoded("a+b/c").is_err());
    }

    #[test]
    fn calculated_length_matches_actual() {
        for len in 0..=66 {
            let data = Base64Url::from_raw(vec![0xA5; len]);
            assert_eq!(data.encoded_len(), data.to_string().len());
        }
    }
}
