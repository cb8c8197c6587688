//! Parser for the XML encoding of an ER model.
//!
//! The document root holds `entity` and `relationship` elements, each with
//! an `id` and a `name`, child `attribute` elements (`id`, optional `name`,
//! `entity_id`, `relation_id`) and child `key` elements whose text is a
//! comma-separated list of attribute ids forming one candidate key.

use std::collections::HashSet;

use crate::model::{Attribute, Entity, ErModel, Relationship};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("<{tag}> element is missing required attribute '{attribute}'")]
    MissingAttribute {
        tag: &'static str,
        attribute: &'static str,
    },
    #[error("Duplicate {tag} id '{id}'")]
    DuplicateId { tag: &'static str, id: String },
    #[error("Duplicate name '{0}' (table names must be unique across the schema)")]
    DuplicateName(String),
    #[error("Empty <key> element in '{0}'")]
    EmptyKey(String),
}

pub fn parse(input: &str) -> Result<ErModel, ParseError> {
    let doc = roxmltree::Document::parse(input)?;
    let mut entities: Vec<Entity> = Vec::new();
    let mut relationships: Vec<Relationship> = Vec::new();

    for node in doc.root_element().children().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "entity" => {
                let parts = parse_parts(node, "entity")?;
                entities.push(Entity {
                    id: parts.id,
                    name: parts.name,
                    attributes: parts.attributes,
                    keys: parts.keys,
                });
            }
            "relationship" => {
                let parts = parse_parts(node, "relationship")?;
                relationships.push(Relationship {
                    id: parts.id,
                    name: parts.name,
                    attributes: parts.attributes,
                    keys: parts.keys,
                });
            }
            // Unknown elements are ignored, matching lenient XML readers.
            _ => {}
        }
    }

    let mut entity_ids = HashSet::new();
    for entity in &entities {
        if !entity_ids.insert(entity.id.as_str()) {
            return Err(ParseError::DuplicateId {
                tag: "entity",
                id: entity.id.clone(),
            });
        }
    }
    let mut relation_ids = HashSet::new();
    for relationship in &relationships {
        if !relation_ids.insert(relationship.id.as_str()) {
            return Err(ParseError::DuplicateId {
                tag: "relationship",
                id: relationship.id.clone(),
            });
        }
    }

    // Table names come from entity/relationship names, so the whole model
    // shares one name space.
    let mut names = HashSet::new();
    for name in entities
        .iter()
        .map(|e| e.name.as_str())
        .chain(relationships.iter().map(|r| r.name.as_str()))
    {
        if !names.insert(name) {
            return Err(ParseError::DuplicateName(name.to_string()));
        }
    }

    log::debug!(
        "parsed {} entities, {} relationships",
        entities.len(),
        relationships.len()
    );
    Ok(ErModel::new(entities, relationships))
}

struct NodeParts {
    id: String,
    name: String,
    attributes: Vec<Attribute>,
    keys: Vec<Vec<String>>,
}

fn parse_parts(node: roxmltree::Node, tag: &'static str) -> Result<NodeParts, ParseError> {
    let id = required(node, tag, "id")?;
    let name = required(node, tag, "name")?;

    let mut attributes = Vec::new();
    let mut keys = Vec::new();
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "attribute" => attributes.push(Attribute {
                id: required(child, "attribute", "id")?,
                name: child.attribute("name").map(str::to_string),
                entity_id: child.attribute("entity_id").map(str::to_string),
                relation_id: child.attribute("relation_id").map(str::to_string),
            }),
            "key" => {
                let ids: Vec<String> = child
                    .text()
                    .unwrap_or("")
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if ids.is_empty() {
                    return Err(ParseError::EmptyKey(name));
                }
                keys.push(ids);
            }
            _ => {}
        }
    }

    Ok(NodeParts {
        id,
        name,
        attributes,
        keys,
    })
}

fn required(
    node: roxmltree::Node,
    tag: &'static str,
    attribute: &'static str,
) -> Result<String, ParseError> {
    node.attribute(attribute)
        .map(str::to_string)
        .ok_or(ParseError::MissingAttribute { tag, attribute })
}
