use crate::domain_port::{Document, StoreError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const USERS: &str = "users";
pub const FRIEND_REQUESTS: &str = "friend_requests";
pub const FRIENDS: &str = "friends";
pub const POSTS: &str = "posts";
pub const LIKES: &str = "likes";
pub const COMMENTS: &str = "comments";
pub const SAVED_POSTS: &str = "saved_posts";

pub fn to_document<T: Serialize>(record: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Decode(format!(
            "record is not an object: {other}"
        ))),
        Err(e) => Err(StoreError::Decode(e.to_string())),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| StoreError::Decode(e.to_string()))
}

/// JSON form of a value for filters and array fields.
pub fn to_value<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Decode(e.to_string()))
}
