//! Deterministic merge of per-chunk graph fragments
//!
//! Extraction produces one fragment per chunk; this module reduces them to
//! a single graph with entity-name and relationship-triple uniqueness.
//! The reduction is pure and order-dependent: fragments must be supplied in
//! chunk order so the tie-breaks below stay reproducible.

use std::collections::{HashMap, HashSet};

use super::{Entity, KnowledgeGraph};

/// Merge a sequence of graph fragments into one graph.
///
/// Fragments are processed in input order with two explicit tie-breaks:
///
/// - **Entities** are deduplicated by exact name. The first occurrence
///   keeps its position (output order is first-seen order) and its type;
///   later occurrences only contribute properties, overwriting existing
///   keys and adding new ones.
/// - **Relationships** are deduplicated by the `(source, target, type)`
///   triple. The first occurrence wins outright; later duplicates are
///   dropped, properties included.
///
/// Endpoint existence is deliberately not validated: a relationship may
/// reference an entity that was never extracted, and storage handles it.
///
/// Merging is idempotent — re-merging a merged graph yields an identical
/// graph — and deterministic, since the output vectors never depend on
/// hash iteration order.
pub fn merge_graphs(fragments: Vec<KnowledgeGraph>) -> KnowledgeGraph {
    let mut entities: Vec<Entity> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    let mut relationships = Vec::new();
    let mut seen_triples: HashSet<(String, String, String)> = HashSet::new();

    for fragment in fragments {
        for entity in fragment.entities {
            match index_by_name.get(&entity.name) {
                Some(&index) => {
                    let existing = &mut entities[index];
                    // First-seen type wins; only properties accumulate.
                    existing.properties.extend(entity.properties);
                    if existing.embedding.is_none() {
                        existing.embedding = entity.embedding;
                    }
                }
                None => {
                    index_by_name.insert(entity.name.clone(), entities.len());
                    entities.push(entity);
                }
            }
        }

        for relationship in fragment.relationships {
            let triple = (
                relationship.source.clone(),
                relationship.target.clone(),
                relationship.rel_type.clone(),
            );
            if seen_triples.insert(triple) {
                relationships.push(relationship);
            }
        }
    }

    KnowledgeGraph {
        entities,
        relationships,
    }
}
