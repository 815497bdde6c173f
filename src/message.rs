//! Pure SCRAM message builders. No I/O; these only ever produce
//! strings and bytes from already-known inputs.

use crate::{attr, connection::Command, mechanism::ScramMechanism, sasl::SaslStart};

/// The GS2 header this crate always sends: no channel binding, no authzid.
pub(crate) const GS2_HEADER: &str = "n,,";

/// The client-first message, split the way the rest of the conversation needs
/// it: the "bare" portion (without the GS2 header) feeds directly into
/// `authMessage`, while the full message (with the header) is what's actually
/// sent on the wire.
pub(crate) struct ClientFirst {
    bare: String,
    nonce_b64: String,
}

impl ClientFirst {
    /// `client_first_bare(username_escaped, nonce_bytes)`.
    pub(crate) fn new(username: &str, nonce_b64: &str) -> Self {
        let bare = format!("n={},r={}", attr::escape_username(username), nonce_b64);
        Self {
            bare,
            nonce_b64: nonce_b64.to_string(),
        }
    }

    pub(crate) fn bare(&self) -> &str {
        &self.bare
    }

    pub(crate) fn nonce(&self) -> &str {
        &self.nonce_b64
    }

    /// The full client-first message, GS2 header included, as sent on the wire.
    pub(crate) fn message(&self) -> String {
        format!("{GS2_HEADER}{}", self.bare)
    }

    /// `client_first_message(credentials, method, nonce) -> SaslStartDoc`.
    pub(crate) fn to_sasl_start(&self, mechanism: ScramMechanism, source: String) -> Command {
        SaslStart::new(source, mechanism, self.message().into_bytes()).into_command()
    }
}

/// `c=biws,r=<rnonce>` — the literal `biws` is the base64 of `n,,`.
pub(crate) fn client_final_without_proof(combined_nonce: &str) -> String {
    format!("c=biws,r={combined_nonce}")
}

/// `client_final(rnonce, clientProof) -> bytes`.
pub(crate) fn client_final(combined_nonce: &str, proof_b64: &str) -> String {
    format!("{},p={proof_b64}", client_final_without_proof(combined_nonce))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_first_bare_has_no_gs2_header() {
        let first = ClientFirst::new("user", "fyko+d2lbbFgONRv9qkxdawL");
        assert_eq!(first.bare(), "n=user,r=fyko+d2lbbFgONRv9qkxdawL");
        assert_eq!(first.message(), "n,,n=user,r=fyko+d2lbbFgONRv9qkxdawL");
    }

    #[test]
    fn client_final_without_proof_uses_fixed_biws_header() {
        assert_eq!(client_final_without_proof("abc123"), "c=biws,r=abc123");
    }

    #[test]
    fn client_final_appends_proof() {
        assert_eq!(client_final("abc123", "cHJvb2Y="), "c=biws,r=abc123,p=cHJvb2Y=");
    }
}
