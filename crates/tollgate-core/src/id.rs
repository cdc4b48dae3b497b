//! Identifiers for execution requests and triggering events.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to every execution request.
/// Uses UUIDv7 so requests created by one event sort by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct ResourceId(Uuid);

impl ResourceId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::str::FromStr for ResourceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Correlation token tying every execution created for one webhook
/// delivery back to that delivery (usually `X-GitHub-Delivery`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ids_are_unique() {
        assert_ne!(ResourceId::new(), ResourceId::new());
    }

    #[test]
    fn test_resource_id_parses_own_display() {
        let id = ResourceId::new();
        let parsed: ResourceId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_event_id_serializes_as_plain_string() {
        let id = EventId::from("event-guid");
        assert_eq!(id.to_string(), "event-guid");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"event-guid\"");
    }
}
