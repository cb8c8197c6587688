//! Dependency resolver: drives table synthesis over strong entities, weak
//! entities, and relationships in an order where every prerequisite table
//! exists first, rejecting circular chains.

use std::collections::HashSet;

use crate::classify;
use crate::decision::DecisionProvider;
use crate::model::{Entity, ErModel, Relationship};
use crate::schema::Schema;
use crate::synth::{self, SynthError};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Relationship {name} is invalid: {reason}")]
    InvalidRelationshipDegree { name: String, reason: String },
    #[error("Circular dependency: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },
    #[error("{context} references unknown id '{id}'")]
    UnresolvedReference { context: String, id: String },
    #[error(transparent)]
    Synth(#[from] SynthError),
}

/// Resolves one ER model into a schema. Owns the mutable accumulator for
/// the duration of the run; an error discards it, so no partial schema
/// escapes.
pub struct Resolver<'a> {
    model: &'a ErModel,
    provider: &'a mut dyn DecisionProvider,
    schema: Schema,
}

impl<'a> Resolver<'a> {
    pub fn new(model: &'a ErModel, provider: &'a mut dyn DecisionProvider) -> Self {
        Self {
            model,
            provider,
            schema: Schema::default(),
        }
    }

    /// Strong entities first (they reference nothing), then weak entities,
    /// then relationships. Relationships may reference weak-entity tables
    /// but never the reverse, so this order needs no backtracking.
    pub fn resolve(mut self) -> Result<Schema, ResolveError> {
        let partition = classify::partition(&self.model.entities);
        log::debug!(
            "resolving {} strong, {} weak, {} relationships",
            partition.strong.len(),
            partition.weak.len(),
            self.model.relationships.len()
        );

        for entity in &partition.strong {
            let table = synth::strong_entity_table(entity, self.provider)?;
            self.schema.insert(table);
        }
        self.resolve_weak_entities(&partition.weak)?;
        self.resolve_relationships()?;
        Ok(self.schema)
    }

    /// LIFO work list per unprocessed weak entity: a node whose dominant
    /// entity has no table yet is pushed back behind its dominant, so the
    /// dominant resolves first. Work-list membership is tracked by id; a
    /// dominant already on the list means the chain is circular.
    fn resolve_weak_entities(&mut self, weak: &[&'a Entity]) -> Result<(), ResolveError> {
        for &entity in weak {
            if self.schema.contains(&entity.name) {
                continue;
            }
            let mut stack: Vec<&Entity> = vec![entity];
            let mut pending: HashSet<&str> = HashSet::from([entity.id.as_str()]);

            while let Some(current) = stack.pop() {
                pending.remove(current.id.as_str());
                let dominant = self.dominant_entity(current)?;

                if let Some(dominant_table) = self.schema.get(&dominant.name) {
                    let table = synth::weak_entity_table(current, dominant_table, self.provider)?;
                    log::debug!("synthesized weak entity table {}", table.name);
                    self.schema.insert(table);
                } else if pending.contains(dominant.id.as_str()) {
                    // dominant_entity never returns `current` itself, so a
                    // self-loop cannot slip past this check.
                    let mut names: Vec<String> =
                        stack.iter().map(|e| e.name.clone()).collect();
                    names.push(current.name.clone());
                    return Err(ResolveError::CircularDependency {
                        chain: cycle_chain(names, &dominant.name),
                    });
                } else {
                    pending.insert(current.id.as_str());
                    pending.insert(dominant.id.as_str());
                    stack.push(current);
                    stack.push(dominant);
                }
            }
        }
        Ok(())
    }

    /// The entity participant of `weak`'s identifying relationship, other
    /// than `weak` itself.
    fn dominant_entity(&self, weak: &Entity) -> Result<&'a Entity, ResolveError> {
        let relation_id = weak
            .attributes
            .iter()
            .find_map(|a| a.relation_id.as_deref())
            .ok_or_else(|| ResolveError::UnresolvedReference {
                context: format!("weak entity {}", weak.name),
                id: String::from("relation_id"),
            })?;
        let relationship =
            self.model
                .relationship(relation_id)
                .ok_or_else(|| ResolveError::UnresolvedReference {
                    context: format!("weak entity {}", weak.name),
                    id: relation_id.to_string(),
                })?;

        let dominant_id = relationship
            .attributes
            .iter()
            .find_map(|a| match a.entity_id.as_deref() {
                Some(id) if id != weak.id => Some(id),
                _ => None,
            })
            .ok_or_else(|| ResolveError::InvalidRelationshipDegree {
                name: relationship.name.clone(),
                reason: format!("no dominant entity for weak entity {}", weak.name),
            })?;

        self.model
            .entity(dominant_id)
            .ok_or_else(|| ResolveError::UnresolvedReference {
                context: format!("relationship {}", relationship.name),
                id: dominant_id.to_string(),
            })
    }

    /// Same work-list discipline as weak entities: a relationship whose
    /// dependent relationship has no table yet is pushed back behind it.
    fn resolve_relationships(&mut self) -> Result<(), ResolveError> {
        for relationship in &self.model.relationships {
            if self.schema.contains(&relationship.name) {
                continue;
            }
            let mut stack: Vec<&Relationship> = vec![relationship];
            let mut pending: HashSet<&str> = HashSet::from([relationship.id.as_str()]);

            while let Some(current) = stack.pop() {
                pending.remove(current.id.as_str());
                self.validate_degree(current)?;

                match self.dependent_relationship(current) {
                    Some(dependent) if !self.schema.contains(&dependent.name) => {
                        // `current` was removed from `pending` at pop time,
                        // so a relationship depending on itself needs its
                        // own check or the node would re-push forever.
                        if dependent.id == current.id
                            || pending.contains(dependent.id.as_str())
                        {
                            let mut names: Vec<String> =
                                stack.iter().map(|r| r.name.clone()).collect();
                            names.push(current.name.clone());
                            return Err(ResolveError::CircularDependency {
                                chain: cycle_chain(names, &dependent.name),
                            });
                        }
                        pending.insert(current.id.as_str());
                        pending.insert(dependent.id.as_str());
                        stack.push(current);
                        stack.push(dependent);
                    }
                    _ => {
                        let table = synth::relationship_table(current, self.model, &self.schema)?;
                        log::debug!("synthesized relationship table {}", table.name);
                        self.schema.insert(table);
                    }
                }
            }
        }
        Ok(())
    }

    /// A relationship must connect exactly two known participants, at most
    /// one of which is another relationship.
    fn validate_degree(&self, relationship: &Relationship) -> Result<(), ResolveError> {
        let mut participants = 0;
        let mut relationship_links = 0;
        for attr in &relationship.attributes {
            if let Some(entity_id) = &attr.entity_id {
                if self.model.entity(entity_id).is_none() {
                    return Err(ResolveError::InvalidRelationshipDegree {
                        name: relationship.name.clone(),
                        reason: format!("participant id '{}' does not resolve", entity_id),
                    });
                }
                participants += 1;
            }
            if let Some(relation_id) = &attr.relation_id {
                if self.model.relationship(relation_id).is_none() {
                    return Err(ResolveError::InvalidRelationshipDegree {
                        name: relationship.name.clone(),
                        reason: format!("participant id '{}' does not resolve", relation_id),
                    });
                }
                participants += 1;
                relationship_links += 1;
            }
        }
        if participants != 2 {
            return Err(ResolveError::InvalidRelationshipDegree {
                name: relationship.name.clone(),
                reason: format!("{} participant links, expected 2", participants),
            });
        }
        if relationship_links > 1 {
            return Err(ResolveError::InvalidRelationshipDegree {
                name: relationship.name.clone(),
                reason: String::from("depends on more than one relationship"),
            });
        }
        Ok(())
    }

    /// The first participant that is itself a relationship, if any. Degree
    /// validation guarantees there is at most one.
    fn dependent_relationship(&self, relationship: &Relationship) -> Option<&'a Relationship> {
        relationship
            .attributes
            .iter()
            .find_map(|a| a.relation_id.as_deref())
            .and_then(|id| self.model.relationship(id))
    }
}

/// Trim a work-list snapshot to the actual cycle: everything before the
/// first occurrence of the repeated node is a seed chain that merely led
/// into the cycle. Names are unique model-wide (parser enforced), so
/// matching by name is as good as matching by id here.
fn cycle_chain(names: Vec<String>, repeated: &str) -> Vec<String> {
    let start = names.iter().position(|n| n == repeated).unwrap_or(0);
    let mut chain = names[start..].to_vec();
    chain.push(repeated.to_string());
    chain
}
