//! Serializer for rendering a finished schema as JSON.

use crate::schema::Schema;

/// Serialize the schema as a pretty-printed JSON object keyed by table
/// name, in table creation order. The table name is the mapping key and is
/// not repeated inside its record.
pub fn to_json(schema: &Schema) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(schema)
}
