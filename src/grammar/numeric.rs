//! Bit-exact decoders for the raw numeric literal encodings shared by
//! both world-file grammars.
//!
//! - `&xxxxxxxx` — 8 hex digits decoded as a big-endian 4-byte
//!   IEEE-754 single (`&3f800000` → `1.0`)
//! - `xHEX…` — up to 16 hex digits, right-padded with zeros to 16
//!   nibbles, decoded as a little-endian unsigned 64-bit integer
//! - `iN` — plain decimal integer, or fixed-point `N / 256` when the
//!   declared kind is a float

/// Decode the digits of a `&`-prefixed float literal (prefix stripped).
///
/// The hex string is a big-endian binary blob: no byte reversal is
/// applied before unpacking.
pub fn hex_float(digits: &str) -> Option<f32> {
    if digits.len() != 8 {
        return None;
    }
    let bits = u32::from_str_radix(digits, 16).ok()?;
    Some(f32::from_bits(bits))
}

/// Decode the digits of an `x`-prefixed integer literal (prefix
/// stripped): right-pad to 16 nibbles, then read little-endian u64.
pub fn hex_u64(digits: &str) -> Option<u64> {
    if digits.is_empty() || digits.len() > 16 {
        return None;
    }
    let mut padded = [b'0'; 16];
    padded[..digits.len()].copy_from_slice(digits.as_bytes());

    let mut bytes = [0u8; 8];
    for (i, pair) in padded.chunks_exact(2).enumerate() {
        let hi = (pair[0] as char).to_digit(16)?;
        let lo = (pair[1] as char).to_digit(16)?;
        bytes[i] = (hi << 4 | lo) as u8;
    }
    Some(u64::from_le_bytes(bytes))
}

/// Decode the digits of an `i`-prefixed fixed-point float literal
/// (prefix stripped): signed integer over 256.
pub fn fixed_point(digits: &str) -> Option<f32> {
    let n: i64 = digits.parse().ok()?;
    Some(n as f32 / 256.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_float_known_values() {
        assert_eq!(hex_float("3f800000"), Some(1.0));
        assert_eq!(hex_float("3f000000"), Some(0.5));
        assert_eq!(hex_float("c1780000"), Some(-15.5));
        assert_eq!(hex_float("43a95780"), Some(338.683_59));
    }

    #[test]
    fn test_hex_float_rejects_bad_width() {
        assert_eq!(hex_float("3f80"), None);
        assert_eq!(hex_float("3f8000000"), None);
        assert_eq!(hex_float(""), None);
    }

    #[test]
    fn test_hex_u64_pads_to_sixteen_nibbles() {
        // 15 nibbles, so one trailing zero nibble is implied.
        assert_eq!(hex_u64("7EC4DD7E7A00000"), Some(526_114_473_086));
        assert_eq!(hex_u64("7EC4DD453100000"), Some(211_625_559_166));
        assert_eq!(hex_u64("7EC4DD417500001"), Some(1_152_922_008_223_073_406));
    }

    #[test]
    fn test_hex_u64_rejects_overlong_or_junk() {
        assert_eq!(hex_u64(""), None);
        assert_eq!(hex_u64("00000000000000000"), None);
        assert_eq!(hex_u64("zz"), None);
    }

    #[test]
    fn test_fixed_point() {
        assert_eq!(fixed_point("99088"), Some(387.0625));
        assert_eq!(fixed_point("-2"), Some(-0.0078125));
        assert_eq!(fixed_point("93331"), Some(364.574_22));
        assert_eq!(fixed_point("0"), Some(0.0));
    }

    mod properties {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hex_float_matches_reference_decode(bits: u32) {
                let digits = format!("{bits:08x}");
                let decoded = hex_float(&digits).unwrap();
                let reference = f32::from_be_bytes(bits.to_be_bytes());
                prop_assert_eq!(decoded.to_bits(), reference.to_bits());
            }

            #[test]
            fn hex_u64_matches_reference_decode(value: u64) {
                // Full-width round trip: encode as the on-disk nibble
                // order (little-endian byte pairs) and decode back.
                let bytes = value.to_le_bytes();
                let digits: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
                prop_assert_eq!(hex_u64(&digits), Some(value));
            }

            #[test]
            fn fixed_point_is_value_over_256(n in -1_000_000i64..1_000_000) {
                let decoded = fixed_point(&n.to_string()).unwrap();
                prop_assert_eq!(decoded, n as f32 / 256.0);
            }
        }
    }
}
