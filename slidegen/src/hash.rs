//! Hashing utilities.

use serde::Serialize;
use sha2::{Digest, Sha256};
use subtle_encoding::hex;

use crate::Error;

/// Compute the SHA256 hash of the given string and return its lowercase
/// hexadecimal representation.
pub fn sha256<S: AsRef<str>>(s: S) -> String {
    let digest = Sha256::digest(s.as_ref().as_bytes());
    String::from_utf8_lossy(&hex::encode(digest)).into_owned()
}

/// SHA256 of the canonical JSON serialization of the given value.
///
/// Maps inside slidegen are ordered, so equal values always serialize to
/// the same text.
pub fn sha256_json<T: Serialize>(value: &T) -> Result<String, Error> {
    Ok(sha256(serde_json::to_string(value)?))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            sha256("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
