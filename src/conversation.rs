//! The state machine driving one SCRAM conversation:
//! `Init → FirstSent → FinalSent → (Done | RetryEmpty → Done) | Failed`.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::{
    attr,
    cache,
    connection::{Connection, RawCommandResponse},
    credential::Credential,
    crypto,
    error::{Error, Result},
    mechanism::ScramMechanism,
    message::{self, ClientFirst},
    password,
    sasl::{SaslContinue, SaslResponse},
};

const MIN_ITERATION_COUNT: u32 = 4096;

/// The parsed `server-first` payload.
struct ServerFirst<'a> {
    /// The exact bytes the server sent, byte-for-byte — `authMessage` is built
    /// from this raw form, never a re-serialization of the parsed fields.
    raw: &'a str,
    combined_nonce: String,
    salt: Vec<u8>,
    iterations: u32,
}

impl<'a> ServerFirst<'a> {
    fn parse(mechanism: ScramMechanism, raw: &'a [u8]) -> Result<Self> {
        let name = mechanism.as_str();
        let text =
            std::str::from_utf8(raw).map_err(|_| Error::invalid_server_response(name))?;
        let fields = attr::parse(text);

        let combined_nonce = fields
            .get("r")
            .ok_or_else(|| Error::invalid_server_response(name))?
            .to_string();
        let salt_b64 = fields
            .get("s")
            .ok_or_else(|| Error::invalid_server_response(name))?;
        let salt = STANDARD
            .decode(salt_b64)
            .map_err(|_| Error::invalid_server_response(name))?;
        let iterations: u32 = fields
            .get("i")
            .ok_or_else(|| Error::invalid_server_response(name))?
            .parse()
            .map_err(|_| Error::invalid_server_response(name))?;

        Ok(ServerFirst {
            raw: text,
            combined_nonce,
            salt,
            iterations,
        })
    }

    /// Validates the iteration count and the combined nonce against the client's
    /// own nonce.
    fn validate(&self, mechanism: ScramMechanism, client_nonce: &str) -> Result<()> {
        let name = mechanism.as_str();

        if self.iterations < MIN_ITERATION_COUNT {
            return Err(Error::weak_iterations(name, self.iterations as usize));
        }

        if !self.combined_nonce.starts_with(client_nonce) {
            return Err(Error::invalid_nonce(
                name,
                "server nonce does not extend the client nonce",
            ));
        }

        // Defensive check against a misconfigured server echoing a placeholder
        // instead of a real nonce.
        if self.combined_nonce.starts_with("nonce") {
            return Err(Error::invalid_nonce(
                name,
                "server nonce looks like an unexpanded placeholder",
            ));
        }

        Ok(())
    }
}

/// The parsed `server-final` payload.
enum ServerFinal {
    Verifier(Vec<u8>),
    Error(String),
}

impl ServerFinal {
    fn parse(mechanism: ScramMechanism, raw: &[u8]) -> Result<Self> {
        let name = mechanism.as_str();
        let text =
            std::str::from_utf8(raw).map_err(|_| Error::invalid_server_response(name))?;

        if let Some(err) = text.strip_prefix("e=") {
            return Ok(ServerFinal::Error(err.to_string()));
        }

        let value = text
            .strip_prefix("v=")
            .ok_or_else(|| Error::invalid_server_response(name))?;
        let signature = STANDARD
            .decode(value)
            .map_err(|_| Error::invalid_server_response(name))?;
        Ok(ServerFinal::Verifier(signature))
    }
}

/// Drives one full SCRAM conversation to completion over `conn`.
///
/// Constructed with the nonce already generated: the nonce is set exactly once
/// per attempt, before any message is built.
pub struct ConversationEngine {
    mechanism: ScramMechanism,
    client_first: ClientFirst,
}

impl ConversationEngine {
    pub fn new(mechanism: ScramMechanism, username: &str, nonce_b64: &str) -> Self {
        Self {
            mechanism,
            client_first: ClientFirst::new(username, nonce_b64),
        }
    }

    pub(crate) fn client_first(&self) -> &ClientFirst {
        &self.client_first
    }

    /// Runs the conversation to completion.
    ///
    /// `speculative_first_response`, if given, is the `speculativeAuthenticate`
    /// sub-document from the handshake reply: the engine is seeded directly into
    /// **FirstSent** and never submits its own `saslStart`.
    pub async fn run<C: Connection>(
        self,
        conn: &mut C,
        credential: &Credential,
        speculative_first_response: Option<RawCommandResponse>,
    ) -> Result<RawCommandResponse> {
        let name = self.mechanism.as_str();
        let source = credential.resolved_source().to_string();

        // Init -> FirstSent
        let server_first_response = match speculative_first_response {
            Some(response) => SaslResponse::parse(name, response)?,
            None => {
                let command = self
                    .client_first
                    .to_sasl_start(self.mechanism, source.clone());
                let raw = conn.send_command(command).await?;
                SaslResponse::parse(name, raw)?
            }
        };

        // FirstSent -> FinalSent
        let server_first = ServerFirst::parse(self.mechanism, &server_first_response.payload)?;
        server_first.validate(self.mechanism, self.client_first.nonce())?;

        let prepped = password::prep(self.mechanism, &credential.username, &credential.password)?;
        let salted_password = cache::get_or_compute(
            self.mechanism,
            &prepped,
            &server_first.salt,
            server_first.iterations,
        );

        let client_key = crypto::hmac(self.mechanism, &salted_password, b"Client Key");
        let server_key = crypto::hmac(self.mechanism, &salted_password, b"Server Key");
        let stored_key = crypto::hash(self.mechanism, &client_key);

        let without_proof = message::client_final_without_proof(&server_first.combined_nonce);
        let auth_message = format!(
            "{},{},{}",
            self.client_first.bare(),
            server_first.raw,
            without_proof
        );

        let client_signature = crypto::hmac(self.mechanism, &stored_key, auth_message.as_bytes());
        let client_proof = crypto::xor(&client_key, &client_signature);
        let expected_server_signature =
            crypto::hmac(self.mechanism, &server_key, auth_message.as_bytes());

        let final_message =
            message::client_final(&server_first.combined_nonce, &STANDARD.encode(&client_proof));
        let command = SaslContinue::new(
            source.clone(),
            server_first_response.conversation_id.clone(),
            final_message.into_bytes(),
        )
        .into_command();
        let raw = conn.send_command(command).await?;
        let final_response = SaslResponse::parse(name, raw)?;

        // FinalSent -> Done or RetryEmpty
        let server_final = ServerFinal::parse(self.mechanism, &final_response.payload)?;
        match server_final {
            ServerFinal::Error(message) => return Err(Error::server(name, message)),
            ServerFinal::Verifier(signature) => {
                if !crypto::constant_time_eq(&signature, &expected_server_signature) {
                    return Err(Error::server_signature_invalid(name));
                }
            }
        }

        if final_response.done {
            return Ok(RawCommandResponse::new(bson::doc! {
                "ok": 1,
                "conversationId": final_response.conversation_id,
                "done": true,
            }));
        }

        // RetryEmpty -> Done
        let noop = SaslContinue::new(source, final_response.conversation_id, Vec::new()).into_command();
        conn.send_command(noop).await
    }
}
