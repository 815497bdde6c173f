//! Process-wide cache of salted passwords, so that repeated authentication
//! against the same server/user pair doesn't re-run PBKDF2. Built on a
//! `std::sync::OnceLock`-backed `RwLock<HashMap<..>>` rather than a
//! lazily-initialized global via a macro.

use std::{
    collections::HashMap,
    sync::{OnceLock, RwLock},
};

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::{crypto, mechanism::ScramMechanism};

/// Entries are purged entirely, all at once, rather than evicted individually
/// (not LRU), once the cache reaches this size.
const MAX_ENTRIES: usize = 200;

#[derive(Clone, Hash, Eq, PartialEq)]
struct CacheKey {
    password_repr: Vec<u8>,
    salt_b64: String,
    iterations: u32,
    mechanism: ScramMechanism,
}

fn cache() -> &'static RwLock<HashMap<CacheKey, Vec<u8>>> {
    static CACHE: OnceLock<RwLock<HashMap<CacheKey, Vec<u8>>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// `get_or_compute(password_repr, salt, iterations, method) -> bytes`.
///
/// `password_repr` must already be prepped, so that SHA-1
/// and SHA-256 never collide on the same cache key even for the same underlying
/// password. A race between two callers computing the same key concurrently is
/// allowed to do the PBKDF2 work twice; both computations yield the same result,
/// so the second writer's insert is simply redundant, not incorrect.
pub(crate) fn get_or_compute(
    mechanism: ScramMechanism,
    password_repr: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Vec<u8> {
    let key = CacheKey {
        password_repr: password_repr.to_vec(),
        salt_b64: STANDARD.encode(salt),
        iterations,
        mechanism,
    };

    if let Some(hit) = cache().read().unwrap().get(&key) {
        return hit.clone();
    }

    let salted_password = crypto::pbkdf2(mechanism, password_repr, salt, iterations);

    let mut guard = cache().write().unwrap();
    if guard.len() >= MAX_ENTRIES {
        guard.clear();
    }
    guard.insert(key, salted_password.clone());
    salted_password
}

#[cfg(test)]
pub(crate) fn clear_for_test() {
    cache().write().unwrap().clear();
}

#[cfg(test)]
pub(crate) fn len_for_test() -> usize {
    cache().read().unwrap().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // The cache is process-wide global state; serialize these tests against each
    // other so one test's `clear_for_test` can't interleave with another's
    // assertions when `cargo test` runs them on separate threads.
    static GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn matches_direct_pbkdf2() {
        let _g = GUARD.lock().unwrap();
        clear_for_test();
        let expected = crypto::pbkdf2(ScramMechanism::Sha256, b"pencil", b"salt", 4096);
        let got = get_or_compute(ScramMechanism::Sha256, b"pencil", b"salt", 4096);
        assert_eq!(got, expected);
    }

    #[test]
    fn sha1_and_sha256_do_not_collide_on_identical_password_repr() {
        let _g = GUARD.lock().unwrap();
        clear_for_test();
        let sha1 = get_or_compute(ScramMechanism::Sha1, b"samebytes", b"salt", 4096);
        let sha256 = get_or_compute(ScramMechanism::Sha256, b"samebytes", b"salt", 4096);
        assert_ne!(sha1.len(), sha256.len());
    }

    #[test]
    fn purges_entirely_once_at_capacity() {
        let _g = GUARD.lock().unwrap();
        clear_for_test();
        for i in 0..MAX_ENTRIES {
            get_or_compute(ScramMechanism::Sha256, b"pw", format!("salt{i}").as_bytes(), 4096);
        }
        assert_eq!(len_for_test(), MAX_ENTRIES);

        // The 200th distinct entry triggers a full purge before the new entry is
        // stored, so exactly one entry survives afterward.
        get_or_compute(ScramMechanism::Sha256, b"pw", b"one-more-salt", 4096);
        assert_eq!(len_for_test(), 1);
    }

    #[test]
    fn second_call_with_same_key_is_a_cache_hit_not_a_new_insert() {
        let _g = GUARD.lock().unwrap();
        clear_for_test();
        let first = get_or_compute(ScramMechanism::Sha256, b"pw", b"salt-x", 4096);
        let after_first = len_for_test();
        let second = get_or_compute(ScramMechanism::Sha256, b"pw", b"salt-x", 4096);
        let after_second = len_for_test();

        assert_eq!(first, second);
        assert_eq!(after_first, 1);
        assert_eq!(after_second, after_first, "second call must not insert a new entry");
    }
}
