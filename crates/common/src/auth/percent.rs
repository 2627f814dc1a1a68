//! Percent-encoding and parameter normalization per OAuth Core 1.0a §5.1
//! and §9.1.1.
//!
//! The rules differ from generic URL encoding in ways servers are strict
//! about: space becomes `%20` (never `+`), hex digits are uppercase, and
//! only `A-Z a-z 0-9 - . _ ~` pass through unencoded. The `urlencoding`
//! crate implements exactly this escape set; the wrappers here exist so the
//! signing contract is owned (and pinned by tests) in one place.

use std::borrow::Cow;

use crate::http::Param;

/// Percent-encode a string for use in signatures, signing keys, and the
/// `Authorization` header. UTF-8 input is encoded byte-by-byte.
pub fn percent_encode(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}

/// Standard percent-decoding, used when parsing form-encoded token
/// responses. `+` is not treated as a space, matching [`percent_encode`].
pub fn percent_decode(encoded: &str) -> Result<Cow<'_, str>, std::string::FromUtf8Error> {
    urlencoding::decode(encoded)
}

/// Produce the canonical parameter string used in the signature base
/// string.
///
/// Every non-file parameter is encoded (name and value), the encoded pairs
/// are sorted byte-wise by name with the value as tiebreak, and the result
/// is joined as `name=value` pairs with `&`. Duplicate names survive, each
/// positioned by its value. This string is only ever an input to signing —
/// the transmitted query/body keeps caller order.
pub fn normalize(params: &[Param]) -> String {
    let mut pairs: Vec<(Cow<'_, str>, Cow<'_, str>)> = params
        .iter()
        .filter_map(|p| p.text().map(|value| (percent_encode(p.name()), percent_encode(value))))
        .collect();
    pairs.sort();
    join_pairs(&pairs)
}

/// Encode parameters preserving caller order, for form bodies and query
/// strings. File parameters must have been routed to multipart before this
/// point.
pub fn form_encode(params: &[Param]) -> String {
    let pairs: Vec<(Cow<'_, str>, Cow<'_, str>)> = params
        .iter()
        .filter_map(|p| p.text().map(|value| (percent_encode(p.name()), percent_encode(value))))
        .collect();
    join_pairs(&pairs)
}

fn join_pairs(pairs: &[(Cow<'_, str>, Cow<'_, str>)]) -> String {
    let mut out = String::new();
    for (name, value) in pairs {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(name);
        out.push('=');
        out.push_str(value);
    }
    out
}

#[cfg(test)]
mod tests {
    //! Unit tests for the parameter codec.

    use super::*;

    #[test]
    fn test_unreserved_set_passes_through() {
        let raw = "ABCXYZabcxyz0189-._~";
        assert_eq!(percent_encode(raw), raw);
    }

    #[test]
    fn test_space_is_percent_twenty_never_plus() {
        assert_eq!(percent_encode("hi there"), "hi%20there");
        assert!(!percent_encode("a b c").contains('+'));
    }

    #[test]
    fn test_reserved_characters_fully_encoded() {
        assert_eq!(percent_encode("&=+?/:"), "%26%3D%2B%3F%2F%3A");
        assert_eq!(percent_encode("*"), "%2A");
        assert_eq!(percent_encode("tR3+Ty81lMeYAr/Fid0kMTYa/WM="), "tR3%2BTy81lMeYAr%2FFid0kMTYa%2FWM%3D");
    }

    #[test]
    fn test_hex_digits_are_uppercase() {
        let encoded = percent_encode("<>");
        assert_eq!(encoded, "%3C%3E");
        assert_eq!(encoded.to_uppercase(), encoded);
    }

    #[test]
    fn test_utf8_encoded_byte_by_byte() {
        // U+00E9 is 0xC3 0xA9 in UTF-8
        assert_eq!(percent_encode("café"), "caf%C3%A9");
        // U+6771 is 0xE6 0x9D 0xB1
        assert_eq!(percent_encode("東"), "%E6%9D%B1");
    }

    #[test]
    fn test_decode_inverts_encode() {
        for raw in ["plain", "hi there", "a&b=c", "café 東", "100% sure?"] {
            let encoded = percent_encode(raw);
            let decoded = percent_decode(&encoded).unwrap();
            assert_eq!(decoded, raw);
        }
    }

    /// The normalization golden vector from OAuth Core §9.1.1: duplicates
    /// sorted by value, space encoded inside the value.
    #[test]
    fn test_normalize_golden_vector() {
        let params = vec![
            Param::new("a", "1"),
            Param::new("c", "hi there"),
            Param::new("f", "50"),
            Param::new("f", "25"),
            Param::new("z", "t"),
            Param::new("z", "p"),
            Param::new("f", "a"),
        ];
        assert_eq!(normalize(&params), "a=1&c=hi%20there&f=25&f=50&f=a&z=p&z=t");
    }

    #[test]
    fn test_normalize_empty_value() {
        let params = vec![Param::new("name", "")];
        assert_eq!(normalize(&params), "name=");
    }

    #[test]
    fn test_normalize_sorts_on_encoded_names() {
        // '~' (unencoded) sorts after the '%' of an encoded space
        let params = vec![Param::new("~x", "1"), Param::new(" x", "2")];
        assert_eq!(normalize(&params), "%20x=2&~x=1");
    }

    #[test]
    fn test_normalize_skips_file_params() {
        let params = vec![
            Param::new("size", "original"),
            Param::file("media", "photo.png", "image/png", vec![1, 2, 3]),
        ];
        assert_eq!(normalize(&params), "size=original");
    }

    /// Wire encoding keeps caller order; only signing sorts.
    #[test]
    fn test_form_encode_preserves_caller_order() {
        let params = vec![Param::new("z", "last"), Param::new("a", "first")];
        assert_eq!(form_encode(&params), "z=last&a=first");
        assert_eq!(normalize(&params), "a=first&z=last");
    }
}
