/// Serde helper functions for custom serialization/deserialization
use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Serialize Duration as whole milliseconds
pub mod duration_millis {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Skip serializing if value is None
#[inline]
pub fn is_none<T>(value: &Option<T>) -> bool {
    value.is_none()
}
