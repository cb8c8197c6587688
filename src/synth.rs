//! Table synthesis: builds one output table from an entity or relationship
//! whose prerequisite tables already exist.

use std::collections::HashSet;

use crate::decision::DecisionProvider;
use crate::keys::{self, KeyError};
use crate::model::{Entity, ErModel, Relationship};
use crate::schema::{ForeignKey, Schema, Table};

#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("{context} references unknown id '{id}'")]
    UnresolvedReference { context: String, id: String },
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Naming rule for every synthesized key column:
/// `<referenced-table-name>_<referenced-column-name>`.
pub fn key_column_name(table: &str, column: &str) -> String {
    format!("{}_{}", table, column)
}

/// One column of an expanded candidate key: either a native named attribute
/// or a column borrowed from the dominant table's primary key.
#[derive(Debug, Clone)]
enum KeyColumn {
    Native(String),
    Borrowed {
        table: String,
        local: String,
        referenced: String,
    },
}

impl KeyColumn {
    fn column_name(&self) -> &str {
        match self {
            KeyColumn::Native(name) => name,
            KeyColumn::Borrowed { local, .. } => local,
        }
    }
}

/// Build the table for a strong entity. Strong entities reference nothing,
/// so the foreign-key list is always empty.
pub fn strong_entity_table(
    entity: &Entity,
    provider: &mut dyn DecisionProvider,
) -> Result<Table, SynthError> {
    entity_table(entity, None, provider)
}

/// Build the table for a weak entity. Key definitions may reference the
/// identifying relationship; such a reference expands into one column per
/// primary-key column of the already-synthesized dominant table.
pub fn weak_entity_table(
    entity: &Entity,
    dominant: &Table,
    provider: &mut dyn DecisionProvider,
) -> Result<Table, SynthError> {
    entity_table(entity, Some(dominant), provider)
}

fn entity_table(
    entity: &Entity,
    dominant: Option<&Table>,
    provider: &mut dyn DecisionProvider,
) -> Result<Table, SynthError> {
    let candidates = expand_candidates(entity, dominant)?;
    let rendered: Vec<Vec<String>> = candidates
        .iter()
        .map(|c| c.iter().map(|k| k.column_name().to_string()).collect())
        .collect();
    let chosen = keys::select_primary_key(&entity.name, &rendered, provider)?;
    let primary_key = rendered[chosen].clone();

    // Native attribute list in declaration order; unnamed link attributes
    // never surface as columns.
    let mut attributes: Vec<String> = entity
        .attributes
        .iter()
        .filter_map(|a| a.name.clone())
        .collect();

    // A native attribute from a rejected alternate key becomes a uniqueness
    // constraint.
    let candidate_pool: HashSet<&str> = rendered
        .iter()
        .flatten()
        .map(|s| s.as_str())
        .collect();
    let unique: Vec<String> = attributes
        .iter()
        .filter(|a| !primary_key.contains(*a) && candidate_pool.contains(a.as_str()))
        .cloned()
        .collect();

    // Borrowed key columns join the attribute list and surface as one
    // foreign key entry per referenced table.
    let mut foreign_keys: Vec<ForeignKey> = Vec::new();
    for column in &candidates[chosen] {
        if let KeyColumn::Borrowed {
            table,
            local,
            referenced,
        } = column
        {
            attributes.push(local.clone());
            match foreign_keys.iter_mut().find(|fk| fk.referenced_table == *table) {
                Some(fk) => fk.references.push((local.clone(), referenced.clone())),
                None => foreign_keys.push(ForeignKey {
                    referenced_table: table.clone(),
                    references: vec![(local.clone(), referenced.clone())],
                }),
            }
        }
    }

    Ok(Table {
        name: entity.name.clone(),
        attributes,
        primary_key,
        foreign_keys,
        unique,
    })
}

fn expand_candidates(
    entity: &Entity,
    dominant: Option<&Table>,
) -> Result<Vec<Vec<KeyColumn>>, SynthError> {
    let mut candidates = Vec::with_capacity(entity.keys.len());
    for key in &entity.keys {
        let mut columns = Vec::new();
        for attr_id in key {
            let attr = entity.attribute(attr_id).ok_or_else(|| {
                SynthError::UnresolvedReference {
                    context: format!("key of {}", entity.name),
                    id: attr_id.clone(),
                }
            })?;
            if let Some(name) = &attr.name {
                columns.push(KeyColumn::Native(name.clone()));
            } else if attr.relation_id.is_some() {
                // A keyed reference to the identifying relationship stands
                // for the dominant table's whole primary key.
                let dominant = dominant.ok_or_else(|| SynthError::UnresolvedReference {
                    context: format!("key of {}", entity.name),
                    id: attr_id.clone(),
                })?;
                for referenced in &dominant.primary_key {
                    columns.push(KeyColumn::Borrowed {
                        table: dominant.name.clone(),
                        local: key_column_name(&dominant.name, referenced),
                        referenced: referenced.clone(),
                    });
                }
            } else {
                // Unnamed and not a link: nothing to key on.
                return Err(SynthError::UnresolvedReference {
                    context: format!("key of {}", entity.name),
                    id: attr_id.clone(),
                });
            }
        }
        candidates.push(columns);
    }
    Ok(candidates)
}

/// Build the table for a relationship. Each of its two participant links
/// contributes one foreign key whose synthesized columns, concatenated in
/// participant order, form the primary key.
pub fn relationship_table(
    relationship: &Relationship,
    model: &ErModel,
    schema: &Schema,
) -> Result<Table, SynthError> {
    let mut own_attributes: Vec<String> = Vec::new();
    let mut primary_key: Vec<String> = Vec::new();
    let mut foreign_keys: Vec<ForeignKey> = Vec::new();

    for attr in &relationship.attributes {
        if let Some(name) = &attr.name {
            own_attributes.push(name.clone());
        }

        let target_name = if let Some(entity_id) = &attr.entity_id {
            model
                .entity(entity_id)
                .map(|e| e.name.as_str())
                .ok_or_else(|| SynthError::UnresolvedReference {
                    context: format!("relationship {}", relationship.name),
                    id: entity_id.clone(),
                })?
        } else if let Some(relation_id) = &attr.relation_id {
            model
                .relationship(relation_id)
                .map(|r| r.name.as_str())
                .ok_or_else(|| SynthError::UnresolvedReference {
                    context: format!("relationship {}", relationship.name),
                    id: relation_id.clone(),
                })?
        } else {
            continue;
        };

        let target = schema
            .get(target_name)
            .ok_or_else(|| SynthError::UnresolvedReference {
                context: format!("relationship {}", relationship.name),
                id: target_name.to_string(),
            })?;

        let mut fk = ForeignKey {
            referenced_table: target.name.clone(),
            references: Vec::new(),
        };
        for referenced in &target.primary_key {
            let local = key_column_name(&target.name, referenced);
            primary_key.push(local.clone());
            fk.references.push((local, referenced.clone()));
        }
        foreign_keys.push(fk);
    }

    let mut attributes = own_attributes;
    attributes.extend(primary_key.iter().cloned());

    Ok(Table {
        name: relationship.name.clone(),
        attributes,
        primary_key,
        foreign_keys,
        unique: Vec::new(),
    })
}
