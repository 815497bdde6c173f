//! Pure cryptographic primitives over byte sequences. No I/O, no state.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::{error::Error, mechanism::ScramMechanism};

/// `H(method, bytes)`: the hash function for `method`, 20 bytes for SHA-1 or 32
/// bytes for SHA-256.
pub(crate) fn hash(mechanism: ScramMechanism, input: &[u8]) -> Vec<u8> {
    match mechanism {
        ScramMechanism::Sha1 => Sha1::digest(input).to_vec(),
        ScramMechanism::Sha256 => Sha256::digest(input).to_vec(),
    }
}

/// `HMAC(method, key, data)`.
pub(crate) fn hmac(mechanism: ScramMechanism, key: &[u8], data: &[u8]) -> Vec<u8> {
    match mechanism {
        ScramMechanism::Sha1 => {
            let mut mac = Hmac::<Sha1>::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
        ScramMechanism::Sha256 => {
            let mut mac =
                Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
    }
}

/// `PBKDF2(method, password_bytes, salt_bytes, iterations, dkLen)`. Output length
/// is always `mechanism.hash_len()`.
pub(crate) fn pbkdf2(
    mechanism: ScramMechanism,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Vec<u8> {
    let mut out = vec![0u8; mechanism.hash_len()];
    match mechanism {
        ScramMechanism::Sha1 => {
            pbkdf2::pbkdf2::<Hmac<Sha1>>(password, salt, iterations, &mut out)
                .expect("output buffer is sized to the hash's digest length")
        }
        ScramMechanism::Sha256 => {
            pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, iterations, &mut out)
                .expect("output buffer is sized to the hash's digest length")
        }
    }
    out
}

/// `RandomBytes(n)`: `n` cryptographically secure random bytes, drawn straight
/// from the OS entropy source so a starved or missing source surfaces as
/// `RandomnessUnavailable` instead of panicking or silently blocking forever.
pub(crate) fn random_bytes(n: usize) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0u8; n];
    getrandom::getrandom(&mut buf).map_err(|e| Error::randomness_unavailable(e.to_string()))?;
    Ok(buf)
}

/// `XOR(a, b)`: equal-length byte-wise XOR. `a` and `b` MUST be the same length;
/// mismatched lengths are a programmer error, not a runtime one.
pub(crate) fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    assert_eq!(a.len(), b.len(), "XOR requires equal-length inputs");
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}

/// Timing-safe byte comparison. Returns `false` immediately on a length mismatch
/// (that comparison is not required to be constant-time, only the equal-length
/// comparison that follows); otherwise every byte pair is compared and the
/// differences are accumulated with bitwise-or so that no early return depends on
/// where in the buffer a mismatch occurs.
///
/// This is the only comparison this crate's server-signature check may use; a
/// naive `==` there would reintroduce a timing side channel.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let diff = a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_is_self_inverse() {
        let a = b"saltedpasswordkeyx12";
        let b = b"clientsignatureyxz34";
        let once = xor(a, b);
        let twice = xor(a, &once);
        assert_eq!(twice, b);
    }

    #[test]
    #[should_panic(expected = "equal-length")]
    fn xor_panics_on_length_mismatch() {
        xor(b"abc", b"ab");
    }

    #[test]
    fn constant_time_eq_reflexive() {
        let x = b"some server signature bytes";
        assert!(constant_time_eq(x, x));
    }

    #[test]
    fn constant_time_eq_detects_single_bit_flip() {
        let a = vec![0b1010_1010u8; 32];
        let mut b = a.clone();
        b[15] ^= 0b0000_0001;
        assert!(!constant_time_eq(&a, &b));
    }

    #[test]
    fn constant_time_eq_false_on_length_mismatch() {
        assert!(!constant_time_eq(b"short", b"longer string"));
    }

    #[test]
    fn hash_lengths_match_mechanism() {
        assert_eq!(hash(ScramMechanism::Sha1, b"x").len(), 20);
        assert_eq!(hash(ScramMechanism::Sha256, b"x").len(), 32);
    }

    #[test]
    fn pbkdf2_output_length_matches_mechanism() {
        assert_eq!(
            pbkdf2(ScramMechanism::Sha1, b"pencil", b"salt", 4096).len(),
            20
        );
        assert_eq!(
            pbkdf2(ScramMechanism::Sha256, b"pencil", b"salt", 4096).len(),
            32
        );
    }

    #[test]
    fn pbkdf2_is_deterministic() {
        let a = pbkdf2(ScramMechanism::Sha256, b"pencil", b"salt", 4096);
        let b = pbkdf2(ScramMechanism::Sha256, b"pencil", b"salt", 4096);
        assert_eq!(a, b);
    }

    #[test]
    fn random_bytes_returns_requested_length() {
        assert_eq!(random_bytes(24).unwrap().len(), 24);
    }
}
