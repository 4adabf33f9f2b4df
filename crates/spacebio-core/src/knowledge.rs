//! # Knowledge Graph Tab
//!
//! View model of the detail overlay's knowledge-graph tab.
//!
//! The graph is static mock content: every record gets the same five
//! entities, four relationships and related concepts. Strengths are whole
//! percentages so no float arithmetic is involved anywhere.

use crate::{Record, RecordId};
use serde::Serialize;

/// Number of entities drawn in the graph visualization.
pub const MAX_DRAWN_NODES: usize = 5;

/// Kind of a knowledge-graph entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Condition,
    Process,
    Organism,
    Structure,
    Environment,
}

impl EntityKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Condition => "Condition",
            Self::Process => "Process",
            Self::Organism => "Organism",
            Self::Structure => "Structure",
            Self::Environment => "Environment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub id: u32,
    pub name: &'static str,
    pub kind: EntityKind,
    pub connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub from: u32,
    pub to: u32,
    pub relation: &'static str,
    pub strength_percent: u8,
}

/// A relationship with both endpoint names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRelationship {
    pub from: &'static str,
    pub relation: &'static str,
    pub to: &'static str,
    pub strength_percent: u8,
}

/// Placement of a drawn node, as percentages of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodePosition {
    pub entity: u32,
    pub left_percent: u32,
    pub top_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeGraph {
    pub record: RecordId,
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
    pub related_concepts: Vec<&'static str>,
}

const fn entity(id: u32, name: &'static str, kind: EntityKind, connections: u32) -> Entity {
    Entity {
        id,
        name,
        kind,
        connections,
    }
}

const fn relationship(from: u32, to: u32, relation: &'static str, strength_percent: u8) -> Relationship {
    Relationship {
        from,
        to,
        relation,
        strength_percent,
    }
}

impl KnowledgeGraph {
    /// The knowledge graph shown for `record`.
    #[must_use]
    pub fn for_record(record: &Record) -> Self {
        Self {
            record: record.id,
            entities: vec![
                entity(1, "Microgravity", EntityKind::Condition, 15),
                entity(2, "Gene Expression", EntityKind::Process, 23),
                entity(3, "Arabidopsis", EntityKind::Organism, 18),
                entity(4, "Cell Wall", EntityKind::Structure, 12),
                entity(5, "Space Flight", EntityKind::Environment, 31),
            ],
            relationships: vec![
                relationship(1, 2, "affects", 80),
                relationship(2, 3, "occurs_in", 90),
                relationship(1, 4, "modifies", 70),
                relationship(5, 1, "creates", 95),
            ],
            related_concepts: vec![
                "Gravitational Biology",
                "Space Adaptation",
                "Molecular Biology",
                "Plant Physiology",
                "Stress Response",
            ],
        }
    }

    #[must_use]
    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Pair each relationship with its endpoint names.
    /// Relationships with an unknown endpoint are skipped.
    #[must_use]
    pub fn resolve_relationships(&self) -> Vec<ResolvedRelationship> {
        self.relationships
            .iter()
            .filter_map(|rel| {
                let from = self.entity(rel.from)?;
                let to = self.entity(rel.to)?;
                Some(ResolvedRelationship {
                    from: from.name,
                    relation: rel.relation,
                    to: to.name,
                    strength_percent: rel.strength_percent,
                })
            })
            .collect()
    }

    /// Positions of the first [`MAX_DRAWN_NODES`] entities on a zig-zag line.
    #[must_use]
    pub fn layout(&self) -> Vec<NodePosition> {
        self.entities
            .iter()
            .take(MAX_DRAWN_NODES)
            .zip(0u32..)
            .map(|(e, i)| NodePosition {
                entity: e.id,
                left_percent: 20 + i * 15,
                top_percent: 30 + (i % 2) * 20,
            })
            .collect()
    }
}
