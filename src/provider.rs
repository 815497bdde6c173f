//! The public façade: `prepare`/`authenticate`, plus the
//! speculative-authentication glue that lets a handshake driver piggy-back the
//! first SCRAM message on its initial handshake.

use base64::{engine::general_purpose::STANDARD, Engine};
use bson::Document;

use crate::{
    connection::{Connection, RawCommandResponse},
    conversation::ConversationEngine,
    credential::Credential,
    crypto,
    error::Result,
    mechanism::ScramMechanism,
};

/// The client-first message produced by [`ScramAuthProvider::prepare`].
///
/// Threaded back into [`ScramAuthProvider::authenticate`] so the caller never
/// has to re-derive the nonce or the client-first-bare string from scratch —
/// it's carried on the value the façade already handed back.
pub struct FirstRound(ConversationEngine);

/// The façade a handshake driver talks to: generate the speculative first
/// message, then complete the conversation once the handshake reply is in.
pub struct ScramAuthProvider {
    mechanism: ScramMechanism,
}

impl ScramAuthProvider {
    /// Builds a façade for the given hash family.
    pub fn new(mechanism: ScramMechanism) -> Self {
        Self { mechanism }
    }

    /// Generates a fresh nonce, builds the client-first message, and embeds it
    /// into `handshake_doc.speculativeAuthenticate`.
    ///
    /// Fails with `RandomnessUnavailable` if nonce generation fails.
    pub fn prepare(
        &self,
        handshake_doc: &mut Document,
        credential: &Credential,
    ) -> Result<FirstRound> {
        let nonce = crypto::random_bytes(24)?;
        let nonce_b64 = STANDARD.encode(nonce);
        let engine = ConversationEngine::new(self.mechanism, &credential.username, &nonce_b64);

        let source = credential.resolved_source().to_string();
        let mut speculative = engine
            .client_first()
            .to_sasl_start(self.mechanism, source.clone())
            .body;
        speculative.insert("db", source);
        handshake_doc.insert("speculativeAuthenticate", speculative);

        Ok(FirstRound(engine))
    }

    /// Drives the conversation to completion.
    ///
    /// `speculative_response`, if the handshake reply carried one, is the
    /// server-first message already obtained for free; the engine adopts it
    /// directly instead of submitting its own `saslStart`.
    pub async fn authenticate<C: Connection>(
        &self,
        conn: &mut C,
        credential: &Credential,
        first_round: FirstRound,
        speculative_response: Option<RawCommandResponse>,
    ) -> Result<RawCommandResponse> {
        first_round.0.run(conn, credential, speculative_response).await
    }
}
