//! Implementations of the JSON Web Algorithms (JWA) standard
//!
//! The specifications for these algorithms can be found in [RFC7518][].
//!
//! [RFC7518]: https://tools.ietf.org/html/rfc7518

pub mod ec;
pub mod hmac;
pub mod rsa;

#[doc(inline)]
pub use ec::EllipticCurve;
#[doc(inline)]
pub use hmac::Hmac;
#[doc(inline)]
pub use rsa::Rsa;
