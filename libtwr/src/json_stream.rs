//! Decoding of concatenated JSON documents.
//!
//! Dump files written by the collectors hold tweets back to back with no
//! delimiter and no enclosing array, e.g. `{"a": 1}{"b": 2}  {"c": 3}`.
//! A plain parser stops after the first value and rejects the rest, so the
//! decoder below reads one document, remembers where it ended and resumes at
//! the next non-whitespace character until the input runs out.

use serde_json::de::StrRead;
use serde_json::{Deserializer, StreamDeserializer};

use crate::{Error, Result, Tweet};

/// Lazily decodes the documents of a concatenated JSON string in order.
///
/// Yields at most one error, after which the decoder is exhausted.
pub struct ConcatDecoder<'de> {
    stream: StreamDeserializer<'de, StrRead<'de>, Tweet>,
    index: usize,
    failed: bool,
}

impl<'de> ConcatDecoder<'de> {
    pub fn new(input: &'de str) -> Self {
        Self {
            stream: Deserializer::from_str(input).into_iter::<Tweet>(),
            index: 0,
            failed: false,
        }
    }

    /// Bytes consumed so far, whitespace after the last document excluded.
    pub fn byte_offset(&self) -> usize {
        self.stream.byte_offset()
    }
}

impl Iterator for ConcatDecoder<'_> {
    type Item = Result<Tweet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let start = self.stream.byte_offset();
        match self.stream.next()? {
            Ok(tweet) => {
                self.index += 1;
                Some(Ok(tweet))
            }
            Err(source) => {
                self.failed = true;
                Some(Err(Error::parse(
                    format!("document {} after byte {}", self.index, start),
                    source,
                )))
            }
        }
    }
}

/// Decodes every document of `input`, failing on the first malformed one.
pub fn decode_concatenated(input: &str) -> Result<Vec<Tweet>> {
    ConcatDecoder::new(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tweet(value: serde_json::Value) -> Tweet {
        Tweet::try_from(value).unwrap()
    }

    #[test]
    fn test_decode_whitespace_separated() {
        let tweets = decode_concatenated(r#"{"a": 1}  {"b": 2}"#).unwrap();
        assert_eq!(tweets, vec![tweet(json!({"a": 1})), tweet(json!({"b": 2}))]);
    }

    #[test]
    fn test_decode_without_delimiter() {
        let input = "{\"n\": 1}{\"n\": 2}\n\n\t{\"n\": 3}\n";
        let tweets = decode_concatenated(input).unwrap();
        let numbers: Vec<_> = tweets.iter().map(|t| t.get("n").cloned()).collect();
        assert_eq!(numbers, vec![Some(json!(1)), Some(json!(2)), Some(json!(3))]);
    }

    #[test]
    fn test_decode_nested_braces_in_strings() {
        let input = r#"{"text": "} not the end {"} {"text": "{\"quoted\"}"}"#;
        let tweets = decode_concatenated(input).unwrap();
        assert_eq!(tweets.len(), 2);
        assert_eq!(tweets[0].text(), Some("} not the end {"));
        assert_eq!(tweets[1].text(), Some("{\"quoted\"}"));
    }

    #[test]
    fn test_decode_empty_input() {
        assert!(decode_concatenated("").unwrap().is_empty());
        assert!(decode_concatenated("  \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_decode_many_documents_keeps_order() {
        let input: String = (0..250)
            .map(|i| format!("{{\"id\": {}}}{}", i, " ".repeat(i % 3)))
            .collect();
        let tweets = decode_concatenated(&input).unwrap();
        assert_eq!(tweets.len(), 250);
        for (i, tweet) in tweets.iter().enumerate() {
            assert_eq!(tweet.id(), Some(i.to_string()));
        }
    }

    #[test]
    fn test_malformed_document_fails() {
        let err = decode_concatenated(r#"{"a": 1} {"b": "#).unwrap_err();
        match err {
            Error::Parse { context, .. } => assert!(context.starts_with("document 1")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_trailing_garbage_fails() {
        assert!(matches!(
            decode_concatenated(r#"{"a": 1} nope"#),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_decoder_fuses_after_error() {
        let mut decoder = ConcatDecoder::new(r#"{"a": 1} ] {"b": 2}"#);
        assert!(decoder.next().unwrap().is_ok());
        assert!(decoder.next().unwrap().is_err());
        assert!(decoder.next().is_none());
    }
}
