//! Mapping between the user-defined field schema and the fixed slot columns
//! on an inventory row.
//!
//! An inventory stores its custom fields in fifteen fixed column pairs: three
//! slots for each of the five field types, each pair being a nullable label
//! and an enabled flag. The slot key (e.g. `custom_string2`) is the durable
//! field identity; the externally visible schema is reconstructed from row
//! state on every read.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

pub const SLOTS_PER_TYPE: usize = 3;
pub const SLOT_COUNT: usize = FieldType::ALL.len() * SLOTS_PER_TYPE;

/// The five supported custom field types, in fixed schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Text,
    Number,
    Boolean,
    Link,
}

impl FieldType {
    pub const ALL: [FieldType; 5] = [
        FieldType::String,
        FieldType::Text,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Link,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Link => "link",
        }
    }

    fn ordinal(self) -> usize {
        match self {
            FieldType::String => 0,
            FieldType::Text => 1,
            FieldType::Number => 2,
            FieldType::Boolean => 3,
            FieldType::Link => 4,
        }
    }
}

lazy_static! {
    /// All fifteen slot keys in fixed type-then-index order.
    pub static ref SLOT_KEYS: Vec<String> = FieldType::ALL
        .iter()
        .flat_map(|ty| (1..=SLOTS_PER_TYPE).map(move |i| format!("custom_{}{}", ty.as_str(), i)))
        .collect();
}

/// A caller-supplied schema entry. Any client-side id accompanying the entry
/// is discarded; only the type and label survive.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldInput {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
}

/// One entry of the externally visible schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaField {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    pub label: Option<String>,
    pub enabled: bool,
}

/// The fifteen slot pairs of one inventory row, in fixed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotMap {
    slots: [Slot; SLOT_COUNT],
}

impl SlotMap {
    /// Maps an ordered field list onto the slots: all pairs reset, then the
    /// first three entries per type are activated in input order. Entries
    /// beyond three per type are silently dropped.
    pub fn from_fields(fields: &[FieldInput]) -> Self {
        let mut map = SlotMap::default();
        let mut used = [0usize; FieldType::ALL.len()];
        for field in fields {
            let ty = field.field_type.ordinal();
            if used[ty] >= SLOTS_PER_TYPE {
                continue;
            }
            let slot = &mut map.slots[ty * SLOTS_PER_TYPE + used[ty]];
            slot.label = Some(field.label.clone());
            slot.enabled = true;
            used[ty] += 1;
        }
        map
    }

    /// Reconstructs the schema by scanning the slots in fixed order. Caller
    /// order is never persisted, so this is also the only order the server
    /// ever emits.
    pub fn schema(&self) -> Vec<SchemaField> {
        let mut fields = Vec::new();
        for ty in FieldType::ALL {
            for i in 0..SLOTS_PER_TYPE {
                let slot = &self.slots[ty.ordinal() * SLOTS_PER_TYPE + i];
                if slot.enabled {
                    fields.push(SchemaField {
                        key: format!("custom_{}{}", ty.as_str(), i + 1),
                        field_type: ty,
                        label: slot.label.clone().unwrap_or_default(),
                    });
                }
            }
        }
        fields
    }

    /// Slot pairs in fixed order, for binding to the slot columns.
    pub fn pairs(&self) -> impl Iterator<Item = (&Option<String>, bool)> {
        self.slots.iter().map(|s| (&s.label, s.enabled))
    }

    pub(crate) fn set_raw(&mut self, index: usize, label: Option<String>, enabled: bool) {
        self.slots[index] = Slot { label, enabled };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(ty: FieldType, label: &str) -> FieldInput {
        FieldInput {
            field_type: ty,
            label: label.into(),
        }
    }

    #[test]
    fn fourth_field_of_a_type_is_silently_dropped() {
        let map = SlotMap::from_fields(&[
            field(FieldType::String, "a"),
            field(FieldType::String, "b"),
            field(FieldType::String, "c"),
            field(FieldType::String, "d"),
        ]);
        let schema = map.schema();
        assert_eq!(schema.len(), 3);
        let labels: Vec<_> = schema.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, ["a", "b", "c"]);
    }

    #[test]
    fn keys_follow_fixed_type_then_index_order() {
        let map = SlotMap::from_fields(&[
            field(FieldType::Link, "homepage"),
            field(FieldType::String, "title"),
            field(FieldType::Boolean, "in stock"),
            field(FieldType::String, "vendor"),
        ]);
        let keys: Vec<_> = map.schema().into_iter().map(|f| f.key).collect();
        // Emitted in fixed order regardless of input order.
        assert_eq!(
            keys,
            ["custom_string1", "custom_string2", "custom_boolean1", "custom_link1"]
        );
    }

    #[test]
    fn round_trip_preserves_facts_not_order() {
        let input = [
            field(FieldType::Number, "price"),
            field(FieldType::String, "name"),
        ];
        let map = SlotMap::from_fields(&input);
        let schema = map.schema();
        assert_eq!(schema[0].field_type, FieldType::String);
        assert_eq!(schema[0].label, "name");
        assert_eq!(schema[1].field_type, FieldType::Number);
        assert_eq!(schema[1].label, "price");
    }

    #[test]
    fn from_fields_resets_previous_state() {
        let mut map = SlotMap::from_fields(&[
            field(FieldType::Text, "notes"),
            field(FieldType::Text, "details"),
        ]);
        map = SlotMap::from_fields(&[field(FieldType::Text, "summary")]);
        let schema = map.schema();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema[0].key, "custom_text1");
        assert_eq!(schema[0].label, "summary");
    }

    #[test]
    fn empty_schema_round_trips_empty() {
        assert!(SlotMap::from_fields(&[]).schema().is_empty());
    }

    #[test]
    fn slot_keys_cover_all_pairs_in_order() {
        assert_eq!(SLOT_KEYS.len(), SLOT_COUNT);
        assert_eq!(SLOT_KEYS[0], "custom_string1");
        assert_eq!(SLOT_KEYS[3], "custom_text1");
        assert_eq!(SLOT_KEYS[14], "custom_link3");
    }

    #[test]
    fn field_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FieldType::Link).unwrap(), "\"link\"");
        let ty: FieldType = serde_json::from_str("\"boolean\"").unwrap();
        assert_eq!(ty, FieldType::Boolean);
    }
}
