//! Per-attempt, immutable input credentials.

/// The username, password, and auth source for one authentication attempt.
///
/// Holds just the fields a SCRAM-only core needs: no `mechanism` or
/// `mechanism_properties` fields, since mechanism selection and other
/// mechanisms' configuration live outside this core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    /// The SCRAM username.
    pub username: String,
    /// The SCRAM password, in plain text.
    pub password: String,
    /// The authentication database. Defaults to `admin` via [`Credential::resolved_source`].
    pub source: Option<String>,
}

impl Credential {
    /// Builds a credential with no explicit authentication source (defaults to `admin`).
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            source: None,
        }
    }

    /// Sets an explicit authentication source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The authentication database this credential targets, defaulting to
    /// `admin`.
    pub fn resolved_source(&self) -> &str {
        self.source.as_deref().unwrap_or("admin")
    }
}
