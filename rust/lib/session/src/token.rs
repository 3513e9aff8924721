use serde_json::Value;

use crate::claims::Claims;
use crate::decode::{Base64Decode, StandardAlphabet};
use crate::error::TokenError;

/// Decodes the payload segment of a compact `header.payload.signature`
/// token into [`Claims`].
///
/// The signature is not verified; the server does that on every request.
/// This codec only reads what the token claims about itself, so the client
/// can notice expiry before the server starts rejecting calls.
///
/// The base64 engine is chosen at construction:
///
/// ```ignore
/// let codec = TokenCodec::new(StandardAlphabet);     // translate + pad
/// let codec = TokenCodec::new(UrlSafeAlphabet);      // direct url-safe
/// let claims = codec.decode(Some(token))?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenCodec<D = StandardAlphabet> {
    decoder: D,
}

impl<D: Base64Decode> TokenCodec<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    /// Decode a token's claims.
    ///
    /// Never panics: every malformed input maps to a [`TokenError`].
    pub fn decode(&self, token: Option<&str>) -> Result<Claims, TokenError> {
        let token = token.ok_or(TokenError::Missing)?;

        let mut segments = token.split('.');
        let _header = segments.next();
        let payload = segments.next().ok_or(TokenError::Malformed(1))?;

        let text = self.decoder.decode_to_utf8(payload)?;
        let value: Value =
            serde_json::from_str(&text).map_err(|e| TokenError::Json(e.to_string()))?;
        if !value.is_object() {
            return Err(TokenError::NotAnObject);
        }
        serde_json::from_value(value).map_err(|e| TokenError::Json(e.to_string()))
    }
}

/// Decode with the default engine.
pub fn decode_token(token: Option<&str>) -> Result<Claims, TokenError> {
    TokenCodec::<StandardAlphabet>::default().decode(token)
}


#[cfg(test)]
mod tests {
    use super::test_tokens::*;
    use super::*;
    use crate::decode::UrlSafeAlphabet;

    // ========================================================================
    // Well-formed tokens
    // ========================================================================

    #[test]
    fn decode_exp_and_subject() {
        let claims = decode_token(Some(&expiring_at(1000))).unwrap();
        assert_eq!(claims.exp, Some(1000));
        assert_eq!(claims.subject(), Some("u-1"));
    }

    #[test]
    fn two_segments_are_enough() {
        let full = expiring_at(1000);
        let (header, rest) = full.split_once('.').unwrap();
        let payload = rest.split('.').next().unwrap();
        let two = format!("{}.{}", header, payload);
        assert_eq!(decode_token(Some(&two)).unwrap().exp, Some(1000));
    }

    #[test]
    fn engines_are_interchangeable() {
        let token = with_payload(r#"{"exp":1000,"note":"?>?>~~~"}"#);
        let a = TokenCodec::new(StandardAlphabet).decode(Some(&token));
        let b = TokenCodec::new(UrlSafeAlphabet).decode(Some(&token));
        assert_eq!(a, b);
        assert_eq!(a.unwrap().exp, Some(1000));
    }

    #[test]
    fn missing_exp_decodes() {
        let claims = decode_token(Some(&with_payload(r#"{"sub":"u-9"}"#))).unwrap();
        assert_eq!(claims.exp, None);
    }

    #[test]
    fn decode_is_repeatable() {
        let token = expiring_at(42);
        assert_eq!(decode_token(Some(&token)), decode_token(Some(&token)));
    }

    // ========================================================================
    // Malformed tokens
    // ========================================================================

    #[test]
    fn missing_token() {
        assert_eq!(decode_token(None), Err(TokenError::Missing));
    }

    #[test]
    fn fewer_than_two_segments() {
        for token in ["", "abc", "eyJleHAiOjEwMDB9"] {
            assert_eq!(decode_token(Some(token)), Err(TokenError::Malformed(1)));
        }
    }

    #[test]
    fn empty_payload_segment() {
        assert!(matches!(decode_token(Some("abc.")), Err(TokenError::Json(_))));
    }

    #[test]
    fn non_base64_payload() {
        assert!(matches!(
            decode_token(Some("a.!!!.c")),
            Err(TokenError::Base64(_))
        ));
    }

    #[test]
    fn non_json_payload() {
        let token = with_payload("not json");
        assert!(matches!(decode_token(Some(&token)), Err(TokenError::Json(_))));
    }

    #[test]
    fn non_object_payload() {
        for payload in ["42", "\"text\"", "[1,2]", "null"] {
            let token = with_payload(payload);
            assert_eq!(decode_token(Some(&token)), Err(TokenError::NotAnObject));
        }
    }
}
