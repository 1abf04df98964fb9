//! JSON-with-comments parsing.
//!
//! Both the central plugin list and installed `config.json` files permit
//! `//` and `/* */` comments; they are stripped before handing the
//! document to serde.

use json_comments::StripComments;
use serde::de::DeserializeOwned;

/// Parse a JSON document that may contain comments.
pub fn from_str<T: DeserializeOwned>(input: &str) -> serde_json::Result<T> {
    serde_json::from_reader(StripComments::new(input.as_bytes()))
}
