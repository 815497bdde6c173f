use std::fmt::{self, Display, Formatter};

/// The SCRAM hash family this engine is parameterized over.
///
/// The caller chooses one of these per attempt; negotiating which one a server
/// supports is the handshake driver's job, not this core's.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ScramMechanism {
    /// `SCRAM-SHA-1`, keyed by MongoDB's legacy `MD5("user:mongo:password")` digest.
    Sha1,
    /// `SCRAM-SHA-256`, keyed by the SASLprep-normalized password.
    Sha256,
}

impl ScramMechanism {
    /// The wire string sent in `saslStart.mechanism`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScramMechanism::Sha1 => "SCRAM-SHA-1",
            ScramMechanism::Sha256 => "SCRAM-SHA-256",
        }
    }

    /// The output length in bytes of this mechanism's hash function: 20 for SHA-1,
    /// 32 for SHA-256.
    pub fn hash_len(&self) -> usize {
        match self {
            ScramMechanism::Sha1 => 20,
            ScramMechanism::Sha256 => 32,
        }
    }
}

impl Display for ScramMechanism {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_strings_match_rfc_names() {
        assert_eq!(ScramMechanism::Sha1.as_str(), "SCRAM-SHA-1");
        assert_eq!(ScramMechanism::Sha256.as_str(), "SCRAM-SHA-256");
    }

    #[test]
    fn hash_lengths_match_hash_family() {
        assert_eq!(ScramMechanism::Sha1.hash_len(), 20);
        assert_eq!(ScramMechanism::Sha256.hash_len(), 32);
    }
}
