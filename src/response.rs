//! Out-of-band turn metadata for the HTTP layer.
//!
//! The synthesized audio is the response body; transcript, feedback text
//! and outcome ride along as headers. Header values must stay within
//! visible ASCII, so anything else (Hindi feedback, say) is
//! base64-encoded and flagged via `X-Encoding` for the client to decode.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::HeaderValue;

use crate::services::turn::TurnResult;

pub const TRANSCRIPTION_HEADER: &str = "X-User-Transcription";
pub const AGENT_RESPONSE_HEADER: &str = "X-Agent-Response";
pub const INTERACTION_RESULT_HEADER: &str = "X-Interaction-Result";
pub const ENCODING_HEADER: &str = "X-Encoding";
pub const BASE64_ENCODING: &str = "base64";

fn header_safe(value: &str) -> bool {
    value.is_ascii() && HeaderValue::from_str(value).is_ok()
}

/// Header name/value pairs for one turn. Transcript and feedback are
/// emitted verbatim when both are representable as header values;
/// otherwise both are base64-encoded and `X-Encoding: base64` is added.
pub fn turn_metadata_headers(result: &TurnResult) -> Vec<(&'static str, String)> {
    let plain = header_safe(&result.transcript) && header_safe(&result.response_text);

    let mut headers = Vec::with_capacity(4);
    if plain {
        headers.push((TRANSCRIPTION_HEADER, result.transcript.clone()));
        headers.push((AGENT_RESPONSE_HEADER, result.response_text.clone()));
    } else {
        headers.push((ENCODING_HEADER, BASE64_ENCODING.to_string()));
        headers.push((TRANSCRIPTION_HEADER, STANDARD.encode(result.transcript.as_bytes())));
        headers.push((
            AGENT_RESPONSE_HEADER,
            STANDARD.encode(result.response_text.as_bytes()),
        ));
    }
    headers.push((
        INTERACTION_RESULT_HEADER,
        result.outcome.as_str().to_string(),
    ));
    headers
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::services::turn::{Outcome, TurnResult};

    fn result(transcript: &str, response_text: &str) -> TurnResult {
        TurnResult {
            transcript: transcript.to_string(),
            response_text: response_text.to_string(),
            outcome: Outcome::Success,
            audio: Bytes::new(),
        }
    }

    fn value<'a>(headers: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn ascii_metadata_is_emitted_verbatim() {
        let headers = turn_metadata_headers(&result("hello world", "Great job!"));
        assert_eq!(value(&headers, TRANSCRIPTION_HEADER), Some("hello world"));
        assert_eq!(value(&headers, AGENT_RESPONSE_HEADER), Some("Great job!"));
        assert_eq!(value(&headers, INTERACTION_RESULT_HEADER), Some("success"));
        assert_eq!(value(&headers, ENCODING_HEADER), None);
    }

    #[test]
    fn non_ascii_metadata_is_base64_encoded() {
        let headers = turn_metadata_headers(&result("hello", "बहुत बढ़िया! 'Hello' सही है।"));
        assert_eq!(value(&headers, ENCODING_HEADER), Some(BASE64_ENCODING));

        let decoded = STANDARD
            .decode(value(&headers, AGENT_RESPONSE_HEADER).unwrap())
            .unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            "बहुत बढ़िया! 'Hello' सही है।"
        );
        // The transcript is encoded alongside, even though it is ASCII,
        // so the client decodes both fields the same way.
        let decoded = STANDARD
            .decode(value(&headers, TRANSCRIPTION_HEADER).unwrap())
            .unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "hello");
    }

    #[test]
    fn control_characters_force_encoding() {
        let headers = turn_metadata_headers(&result("line\nbreak", "ok"));
        assert_eq!(value(&headers, ENCODING_HEADER), Some(BASE64_ENCODING));
    }

    #[test]
    fn every_turn_carries_an_outcome_tag() {
        let mut r = result("a", "b");
        r.outcome = Outcome::Failure;
        let headers = turn_metadata_headers(&r);
        assert_eq!(value(&headers, INTERACTION_RESULT_HEADER), Some("failure"));
    }
}
