//! Building `saslStart`/`saslContinue` command documents and parsing their
//! replies — the SASL envelope SCRAM messages travel inside.

use bson::{doc, Bson, Document};

use crate::{
    bson_util,
    connection::{binary_payload, Command, RawCommandResponse},
    error::{Error, Result},
    mechanism::ScramMechanism,
};

/// Builds a `saslStart` command.
pub(crate) struct SaslStart {
    source: String,
    mechanism: ScramMechanism,
    payload: Vec<u8>,
}

impl SaslStart {
    pub(crate) fn new(source: String, mechanism: ScramMechanism, payload: Vec<u8>) -> Self {
        Self {
            source,
            mechanism,
            payload,
        }
    }

    pub(crate) fn into_command(self) -> Command {
        let body = doc! {
            "saslStart": 1,
            "mechanism": self.mechanism.as_str(),
            "payload": binary_payload(self.payload),
            "autoAuthorize": 1,
            "options": { "skipEmptyExchange": true },
        };

        Command::new("saslStart", self.source, body)
    }
}

/// Builds a `saslContinue` command.
pub(crate) struct SaslContinue {
    source: String,
    conversation_id: Bson,
    payload: Vec<u8>,
}

impl SaslContinue {
    pub(crate) fn new(source: String, conversation_id: Bson, payload: Vec<u8>) -> Self {
        Self {
            source,
            conversation_id,
            payload,
        }
    }

    pub(crate) fn into_command(self) -> Command {
        let body = doc! {
            "saslContinue": 1,
            "conversationId": self.conversation_id,
            "payload": binary_payload(self.payload),
        };

        Command::new("saslContinue", self.source, body)
    }
}

/// The parsed reply to a `saslStart` or `saslContinue` command.
pub(crate) struct SaslResponse {
    pub(crate) conversation_id: Bson,
    /// `true` once the conversation is over. Defaults to `true` when the field
    /// is missing but `ok: 1` is present, since some servers omit `done` on a
    /// successful final reply rather than spelling out `false`/`true`.
    pub(crate) done: bool,
    pub(crate) payload: Vec<u8>,
}

impl SaslResponse {
    pub(crate) fn parse(mechanism: &str, response: RawCommandResponse) -> Result<Self> {
        response.validate(mechanism)?;
        Self::parse_document(mechanism, response.raw_response)
    }

    fn parse_document(mechanism: &str, mut response: Document) -> Result<Self> {
        let conversation_id = response
            .remove("conversationId")
            .ok_or_else(|| Error::invalid_server_response(mechanism))?;

        // `done` absent but `ok: 1` present also means the conversation is over;
        // some servers omit `done` on the final reply rather than sending `false`.
        let done = match response.remove("done") {
            Some(b) => b
                .as_bool()
                .ok_or_else(|| Error::invalid_server_response(mechanism))?,
            None => match response.get("ok") {
                Some(ok) => bson_util::get_int(ok) == Some(1),
                None => return Err(Error::invalid_server_response(mechanism)),
            },
        };

        let payload = match response.remove("payload") {
            Some(Bson::Binary(bin)) => bin.bytes,
            Some(Bson::String(s)) => s.into_bytes(),
            _ => return Err(Error::invalid_server_response(mechanism)),
        };

        Ok(SaslResponse {
            conversation_id,
            done,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::binary_payload as payload_bson;

    #[test]
    fn sasl_start_sets_skip_empty_exchange() {
        let command = SaslStart::new(
            "admin".to_string(),
            ScramMechanism::Sha256,
            b"n,,n=user,r=abc".to_vec(),
        )
        .into_command();

        assert_eq!(command.body.get_i32("saslStart").unwrap(), 1);
        assert_eq!(command.body.get_str("mechanism").unwrap(), "SCRAM-SHA-256");
        let options = command.body.get_document("options").unwrap();
        assert_eq!(options.get_bool("skipEmptyExchange").unwrap(), true);
    }

    #[test]
    fn sasl_continue_carries_conversation_id_through() {
        let command = SaslContinue::new("admin".to_string(), Bson::Int32(7), b"c=biws".to_vec())
            .into_command();
        assert_eq!(command.body.get_i32("conversationId").unwrap(), 7);
    }

    #[test]
    fn parses_binary_and_string_payloads() {
        let mut doc = doc! { "conversationId": 1, "done": false };
        doc.insert("payload", payload_bson(b"r=abc,s=def,i=4096".to_vec()));
        let response = SaslResponse::parse_document("SCRAM-SHA-256", doc).unwrap();
        assert_eq!(response.payload, b"r=abc,s=def,i=4096");
        assert!(!response.done);

        let doc = doc! { "conversationId": 1, "done": true, "payload": "v=abc" };
        let response = SaslResponse::parse_document("SCRAM-SHA-256", doc).unwrap();
        assert_eq!(response.payload, b"v=abc");
        assert!(response.done);
    }

    #[test]
    fn missing_conversation_id_is_an_invalid_response() {
        let doc = doc! { "done": true, "payload": "v=abc" };
        assert!(SaslResponse::parse_document("SCRAM-SHA-256", doc).is_err());
    }

    #[test]
    fn missing_done_with_ok_1_defaults_to_done() {
        let doc = doc! { "conversationId": 1, "ok": 1, "payload": "v=abc" };
        let response = SaslResponse::parse_document("SCRAM-SHA-256", doc).unwrap();
        assert!(response.done);
    }

    #[test]
    fn missing_done_and_missing_ok_is_an_invalid_response() {
        let doc = doc! { "conversationId": 1, "payload": "v=abc" };
        assert!(SaslResponse::parse_document("SCRAM-SHA-256", doc).is_err());
    }
}
