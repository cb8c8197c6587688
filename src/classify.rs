use crate::model::Entity;

/// Entities split by whether their identity depends on a relationship.
#[derive(Debug)]
pub struct Partition<'a> {
    pub strong: Vec<&'a Entity>,
    pub weak: Vec<&'a Entity>,
}

/// Partition entities into strong and weak. An entity is weak when at least
/// one of its attributes carries a `relation_id`; everything else, malformed
/// or not, classifies as strong.
pub fn partition(entities: &[Entity]) -> Partition<'_> {
    let mut strong = Vec::new();
    let mut weak = Vec::new();
    for entity in entities {
        if entity.attributes.iter().any(|a| a.relation_id.is_some()) {
            weak.push(entity);
        } else {
            strong.push(entity);
        }
    }
    Partition { strong, weak }
}
