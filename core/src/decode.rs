//! JSON response decoding.

use serde::de::DeserializeOwned;

use crate::http::Body;

/// Decode the first JSON value in `body` as a `T`.
///
/// Consumes the body, so it is dropped before this returns whether decoding
/// succeeds or not. Data after the first value is ignored; an empty body is
/// an EOF error.
pub fn decode_json<T: DeserializeOwned>(body: Body) -> Result<T, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_reader(body);
    T::deserialize(&mut de)
}
