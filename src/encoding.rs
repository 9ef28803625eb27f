//! Converts raw parameter text from the declared source encoding to UTF-8.

use encoding_rs::{Encoding, UTF_8};
use log::warn;

use crate::params::{Param, Params};

/// Rewrites every [`Param::Raw`] value, at any depth, as UTF-8 text.
///
/// Returns `params` untouched when `source` is already UTF-8. Malformed
/// sequences are replaced with U+FFFD rather than failing the call.
pub fn normalize(params: Params, source: &'static Encoding) -> Params {
    if source == UTF_8 {
        return params;
    }

    params
        .into_iter()
        .map(|(key, value)| {
            let value = normalize_value(&key, value, source);
            (key, value)
        })
        .collect()
}

fn normalize_value(key: &str, value: Param, source: &'static Encoding) -> Param {
    match value {
        Param::Raw(bytes) => {
            let (text, had_errors) = source.decode_without_bom_handling(&bytes);
            if had_errors {
                warn!(
                    "Parameter '{}' is not valid {}; invalid sequences replaced",
                    key,
                    source.name()
                );
            }
            Param::Text(text.into_owned())
        }
        Param::List(items) => Param::List(
            items
                .into_iter()
                .map(|item| normalize_value(key, item, source))
                .collect(),
        ),
        Param::Map(map) => Param::Map(normalize(map, source)),
        other => other,
    }
}

/// Looks up an encoding by WHATWG label, e.g. `"windows-1251"` or `"koi8-r"`.
pub fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.as_bytes())
}
