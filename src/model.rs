use std::collections::HashMap;

/// One attribute of an entity or relationship.
///
/// `name` is absent when the attribute is purely a structural link. At most
/// one of `entity_id`/`relation_id` is set: on a relationship they mark the
/// participant the attribute stands for, on a weak entity `relation_id`
/// marks the identifying relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub id: String,
    pub name: Option<String>,
    pub entity_id: Option<String>,
    pub relation_id: Option<String>,
}

impl Attribute {
    /// Whether this attribute links to another entity or relationship.
    pub fn is_participant(&self) -> bool {
        self.entity_id.is_some() || self.relation_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub name: String,
    /// Declaration order. Orderings that reach the output are never taken
    /// from an unordered map.
    pub attributes: Vec<Attribute>,
    /// Candidate keys, each a list of attribute ids.
    pub keys: Vec<Vec<String>>,
}

impl Entity {
    pub fn attribute(&self, id: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.id == id)
    }
}

/// Same shape as [`Entity`], but its attributes are the participant links.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub keys: Vec<Vec<String>>,
}

/// The ingested ER model. Created once by the parser, never mutated.
#[derive(Debug, Clone)]
pub struct ErModel {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
    entity_index: HashMap<String, usize>,
    relation_index: HashMap<String, usize>,
}

impl ErModel {
    pub fn new(entities: Vec<Entity>, relationships: Vec<Relationship>) -> Self {
        let entity_index = entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
        let relation_index = relationships
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        Self {
            entities,
            relationships,
            entity_index,
            relation_index,
        }
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entity_index.get(id).map(|&i| &self.entities[i])
    }

    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relation_index.get(id).map(|&i| &self.relationships[i])
    }
}
