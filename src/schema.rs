//! Output records of the conversion: tables and the schema accumulator.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// One synthesized foreign key. `references` maps each locally introduced
/// key column to the referenced table's primary-key column it stands for,
/// in the referenced primary key's order. One entry per referenced table,
/// so composite keys stay grouped.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ForeignKey {
    pub referenced_table: String,
    #[serde(serialize_with = "pairs_as_map")]
    pub references: Vec<(String, String)>,
}

fn pairs_as_map<S: Serializer>(pairs: &[(String, String)], ser: S) -> Result<S::Ok, S::Error> {
    let mut map = ser.serialize_map(Some(pairs.len()))?;
    for (local, referenced) in pairs {
        map.serialize_entry(local, referenced)?;
    }
    map.end()
}

/// One finished table. The name is serialized as the schema mapping key,
/// not repeated inside the record.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Table {
    #[serde(skip)]
    pub name: String,
    pub attributes: Vec<String>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub unique: Vec<String>,
}

/// The schema accumulator: finished tables in creation order, with name
/// lookup. Owned exclusively by the resolver during a run; tables are never
/// rebuilt or removed once inserted.
#[derive(Debug, Default)]
pub struct Schema {
    tables: Vec<Table>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.index.get(name).map(|&i| &self.tables[i])
    }

    /// Insert a finished table. A name that already has a table keeps the
    /// existing one; callers check `contains` before synthesizing.
    pub fn insert(&mut self, table: Table) {
        if self.index.contains_key(&table.name) {
            return;
        }
        self.index.insert(table.name.clone(), self.tables.len());
        self.tables.push(table);
    }

    /// Tables in creation order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        let mut map = ser.serialize_map(Some(self.tables.len()))?;
        for table in &self.tables {
            map.serialize_entry(&table.name, table)?;
        }
        map.end()
    }
}
