//! Base64url payload decoding.
//!
//! The codec does not care how the bytes get decoded, only that the result
//! is UTF-8 text. Two engines are provided and picked when the codec is
//! built; both accept every payload a JWT issuer produces.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::error::TokenError;

/// Decodes a base64 payload segment into UTF-8 text.
pub trait Base64Decode: Send + Sync {
    fn decode_to_utf8(&self, input: &str) -> Result<String, TokenError>;
}

/// Padded standard alphabet, requires `=` padding after translation.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

/// URL-safe alphabet, padding optional.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Translates the URL-safe alphabet to the standard one, pads to a multiple
/// of four and decodes with the standard alphabet.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardAlphabet;

impl StandardAlphabet {
    /// `-` → `+`, `_` → `/`, then `=` up to a multiple of 4.
    pub fn translate(input: &str) -> String {
        let mut out: String = input
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                other => other,
            })
            .collect();
        while out.len() % 4 != 0 {
            out.push('=');
        }
        out
    }
}

impl Base64Decode for StandardAlphabet {
    fn decode_to_utf8(&self, input: &str) -> Result<String, TokenError> {
        let bytes = STANDARD_LENIENT
            .decode(Self::translate(input))
            .map_err(|e| TokenError::Base64(e.to_string()))?;
        String::from_utf8(bytes).map_err(|_| TokenError::Utf8)
    }
}

/// Decodes the URL-safe alphabet directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlSafeAlphabet;

impl Base64Decode for UrlSafeAlphabet {
    fn decode_to_utf8(&self, input: &str) -> Result<String, TokenError> {
        let bytes = URL_SAFE_LENIENT
            .decode(input)
            .map_err(|e| TokenError::Base64(e.to_string()))?;
        String::from_utf8(bytes).map_err(|_| TokenError::Utf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    #[test]
    fn translate_swaps_alphabet_and_pads() {
        assert_eq!(StandardAlphabet::translate("a-b_"), "a+b/");
        assert_eq!(StandardAlphabet::translate("abcde"), "abcde===");
        assert_eq!(StandardAlphabet::translate("abcdef"), "abcdef==");
        assert_eq!(StandardAlphabet::translate("abcdefg"), "abcdefg=");
        assert_eq!(StandardAlphabet::translate(""), "");
    }

    #[test]
    fn both_engines_agree_on_url_safe_input() {
        // "?>?>" encodes to characters outside the standard alphabet.
        let text = r#"{"note":"?>?>~~~","exp":1000}"#;
        let encoded = URL_SAFE_NO_PAD.encode(text);
        assert!(encoded.contains('-') || encoded.contains('_'));

        assert_eq!(StandardAlphabet.decode_to_utf8(&encoded).unwrap(), text);
        assert_eq!(UrlSafeAlphabet.decode_to_utf8(&encoded).unwrap(), text);
    }

    #[test]
    fn url_safe_accepts_padded_input() {
        let padded = base64::engine::general_purpose::URL_SAFE.encode("ab");
        assert!(padded.ends_with('='));
        assert_eq!(UrlSafeAlphabet.decode_to_utf8(&padded).unwrap(), "ab");
    }

    #[test]
    fn invalid_characters_rejected() {
        assert!(matches!(
            StandardAlphabet.decode_to_utf8("!!!!"),
            Err(TokenError::Base64(_))
        ));
        assert!(matches!(
            UrlSafeAlphabet.decode_to_utf8("!!!!"),
            Err(TokenError::Base64(_))
        ));
    }

    #[test]
    fn impossible_length_rejected() {
        // A single trailing sextet can never encode a whole byte.
        assert!(StandardAlphabet.decode_to_utf8("abcde").is_err());
        assert!(UrlSafeAlphabet.decode_to_utf8("abcde").is_err());
    }

    #[test]
    fn non_utf8_rejected() {
        let encoded = URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0xfd]);
        assert_eq!(StandardAlphabet.decode_to_utf8(&encoded), Err(TokenError::Utf8));
        assert_eq!(UrlSafeAlphabet.decode_to_utf8(&encoded), Err(TokenError::Utf8));
    }
}
