// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Game event payloads as pushed by the data provider.

use hashbrown::HashMap;
use thiserror::Error;

/// An asynchronous game event: a kind plus named string fields.
///
/// Fields are whatever the provider could read; announcers must treat any of
/// them as possibly missing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventPayload {
    kind: String,
    fields: HashMap<String, String>,
}

impl EventPayload {
    /// An event of `kind` with no fields.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: HashMap::new(),
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Event kind used to route the payload to subscriptions.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// A required field, or [`MalformedEvent::MissingField`].
    pub fn field(&self, name: &str) -> Result<&str, MalformedEvent> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| MalformedEvent::MissingField {
                kind: self.kind.clone(),
                field: name.to_owned(),
            })
    }

    /// An optional field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// An event payload that cannot be announced.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MalformedEvent {
    /// A required field is absent.
    #[error("`{kind}` event is missing field `{field}`")]
    MissingField {
        /// Event kind.
        kind: String,
        /// Name of the missing field.
        field: String,
    },
    /// A field is present but unusable.
    #[error("`{kind}` event has invalid field `{field}`: {reason}")]
    InvalidField {
        /// Event kind.
        kind: String,
        /// Name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_names_kind_and_field() {
        let ev = EventPayload::new("villager_born").with_field("name", "Ada");
        assert_eq!(ev.field("name"), Ok("Ada"));
        assert_eq!(ev.get("house"), None);
        let err = ev.field("house").unwrap_err();
        assert_eq!(err.to_string(), "`villager_born` event is missing field `house`");
    }
}
