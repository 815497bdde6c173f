//! Password preparation: turns the user-supplied password into the
//! bytes that feed PBKDF2, in whichever way the mechanism's RFC requires.

use md5::{Digest, Md5};

use crate::{error::Error, mechanism::ScramMechanism, trace};

/// `prep(method, username, password) -> bytes`.
///
/// - SHA-1 uses MongoDB's legacy password digest (`lowercase_hex(MD5("user:mongo:pass"))`),
///   not SASLprep.
/// - SHA-256 uses SASLprep. If SASLprep rejects the password (e.g. it contains a
///   codepoint prohibited by RFC 4013), this falls back to the password's raw
///   UTF-8 bytes and emits a one-time warning rather than failing the attempt —
///   the RFC mandates SASLprep, but a hard failure here would be strictly worse
///   than a server round trip that may still succeed.
pub(crate) fn prep(mechanism: ScramMechanism, username: &str, password: &str) -> Result<Vec<u8>, Error> {
    if password.is_empty() {
        return Err(Error::invalid_input("password must not be empty"));
    }

    match mechanism {
        ScramMechanism::Sha1 => {
            let mut md5 = Md5::new();
            md5.update(format!("{}:mongo:{}", username, password));
            Ok(hex::encode(md5.finalize()).into_bytes())
        }
        ScramMechanism::Sha256 => match stringprep::saslprep(password) {
            Ok(prepped) => Ok(prepped.into_owned().into_bytes()),
            Err(_) => {
                trace::warn_saslprep_unavailable_once();
                Ok(password.as_bytes().to_vec())
            }
        },
    }
}
