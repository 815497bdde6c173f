//! The single logging sink this crate calls into. Gated behind the
//! `tracing-unstable` feature so that taking a dependency on `tracing` is
//! opt-in.

use std::sync::Once;

/// Event target for the one-time SASLprep-unavailable warning.
pub(crate) const SASLPREP_UNAVAILABLE_TARGET: &str = "scram_auth_core::password::sha256";

static SASLPREP_WARNING: Once = Once::new();

/// Emits the "SCRAM-SHA-256 selected but no SASLprep available" warning at most
/// once per process. A no-op unless the `tracing-unstable` feature is enabled.
pub(crate) fn warn_saslprep_unavailable_once() {
    SASLPREP_WARNING.call_once(|| {
        #[cfg(feature = "tracing-unstable")]
        {
            tracing::warn!(
                target: SASLPREP_UNAVAILABLE_TARGET,
                "SCRAM-SHA-256 password preparation fell back to raw UTF-8 because no \
                 SASLprep implementation was available; this may fail against servers that \
                 stored a SASLprep-normalized password",
            );
        }
    });
}
