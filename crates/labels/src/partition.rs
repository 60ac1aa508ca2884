use crate::Result;
use std::fmt::Write;

/// AsciiSet matching the escaping behavior of Go's url.QueryEscape, which is
/// the encoding the broker applies to logical partition values embedded in
/// journal names and label values. Space is handled separately (it maps to
/// `+`).
const QUERY_ESCAPE: &percent_encoding::AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b' ');

/// Encode a partitioned string field value by appending into the given
/// String and returning the result. Encoded values are suitable for embedding
/// within journal names as well as label values, and match the broker's own
/// encoding byte-for-byte.
///
/// Note that partition values of types *other* than strings use a common `%_`
/// prefix, which can never be produced by a query-encoded string. Only string
/// values are encoded by the gateway.
pub fn encode_field_value(mut b: String, value: &str) -> String {
    for chunk in percent_encoding::utf8_percent_encode(value, QUERY_ESCAPE) {
        for c in chunk.chars() {
            b.write_char(if c == ' ' { '+' } else { c }).unwrap();
        }
    }
    b
}

/// Decode a partitioned string field value.
pub fn decode_field_value(value: &str) -> Result<String> {
    let value = value.replace('+', " ");
    Ok(percent_encoding::percent_decode_str(&value)
        .decode_utf8()
        .map_err(crate::Error::InvalidPartitionUtf8)?
        .to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partition_value_encoding_round_trip() {
        for (raw, encoded) in [
            ("acme/", "acme%2F"),
            ("acme corp/tenant", "acme+corp%2Ftenant"),
            ("plain-value_1.ok~", "plain-value_1.ok~"),
            ("per%cent", "per%25cent"),
            ("ünïcode", "%C3%BCn%C3%AFcode"),
        ] {
            assert_eq!(encode_field_value(String::new(), raw), encoded);
            assert_eq!(decode_field_value(encoded).unwrap(), raw);
        }
    }

    #[test]
    fn test_encoding_appends() {
        let b = encode_field_value("name=".to_string(), "a/b");
        assert_eq!(b, "name=a%2Fb");
    }
}
