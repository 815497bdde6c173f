//! The connection/transport abstraction this crate treats as an external
//! collaborator. A real driver plugs its wire-protocol connection in by
//! implementing [`Connection`]; this crate never constructs or pools
//! connections itself.

use bson::{Bson, Document};

use crate::{bson_util, error::Error};

/// A command ready to be sent to `<target_db>.$cmd`.
///
/// Mirrors the shape of a driver's own command abstraction: a command name (used
/// for logging/diagnostics only), the target database, and the command body.
#[derive(Debug, Clone)]
pub struct Command {
    /// The command's name, for logging/diagnostics only.
    pub name: String,
    /// The database the command targets (`<target_db>.$cmd`).
    pub target_db: String,
    /// The command document itself.
    pub body: Document,
}

impl Command {
    pub fn new(name: impl Into<String>, target_db: impl Into<String>, body: Document) -> Self {
        Self {
            name: name.into(),
            target_db: target_db.into(),
            body,
        }
    }
}

/// The reply to a [`Command`].
///
/// A reply is either a result document (which may itself carry `$err` /
/// `errmsg` to indicate a server-side failure) or the connection fails the
/// call outright with a transport error, represented here as `Err` from
/// [`Connection::send_command`] rather than as a variant of this type.
#[derive(Debug, Clone)]
pub struct RawCommandResponse {
    /// The command reply document, unmodified.
    pub raw_response: Document,
}

impl RawCommandResponse {
    pub fn new(raw_response: Document) -> Self {
        Self { raw_response }
    }

    /// `true` unless the response carries an explicit `ok: 0` (or equivalent falsy
    /// numeric). A response with no `ok` field at all is treated as successful;
    /// only an `ok` present and not `1` counts as failure.
    pub fn is_success(&self) -> bool {
        match self.raw_response.get("ok") {
            None => true,
            Some(ok) => bson_util::get_int(ok) == Some(1),
        }
    }

    pub(crate) fn validate(&self, mechanism: &str) -> crate::error::Result<()> {
        if self.is_success() {
            return Ok(());
        }

        Err(Error::server(
            mechanism,
            self.raw_response
                .get_str("errmsg")
                .unwrap_or("authentication failure"),
        ))
    }
}

impl From<Document> for RawCommandResponse {
    fn from(raw_response: Document) -> Self {
        Self::new(raw_response)
    }
}

/// The connection handle this core is driven over.
///
/// A real driver's connection pool implements this for its pooled wire-protocol
/// connection type; this crate only ever calls `send_command` in strict
/// request/reply sequence on a single connection.
pub trait Connection {
    /// Submit `command` to `<command.target_db>.$cmd` and await the reply.
    ///
    /// A transport-level failure (socket error, timeout, cancellation propagated
    /// from below) is surfaced as `Err`; a structured server-side failure is still
    /// `Ok` and is inspected via [`RawCommandResponse::is_success`].
    fn send_command(
        &mut self,
        command: Command,
    ) -> impl std::future::Future<Output = crate::error::Result<RawCommandResponse>> + Send;
}

pub(crate) fn binary_payload(bytes: Vec<u8>) -> Bson {
    Bson::Binary(bson::Binary {
        subtype: bson::spec::BinarySubtype::Generic,
        bytes,
    })
}
