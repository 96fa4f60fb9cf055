//! Built-in graph edge component
//!
//! An edge entity is an ordinary entity carrying an [`Edge`] component
//! that names two endpoint entities by id. Endpoints may go invalid when
//! their entities are removed; the flag records which ends are live.

use crate::entity::Entity;

/// Endpoint liveness flag of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeFlag {
    /// Both endpoints live
    #[default]
    Transitive,
    /// Endpoint A invalid, endpoint B live
    ANodeTerminal,
    /// Endpoint A live, endpoint B invalid
    BNodeTerminal,
    /// Both endpoints invalid
    Null,
}

/// Relationship between two node entities
///
/// `edge_id` is the id of the entity carrying this component and never
/// changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edge {
    pub edge_id: Entity,
    pub node_a: Entity,
    pub node_b: Entity,
    pub flag: EdgeFlag,
}

impl Edge {
    /// Edge between two live nodes
    pub fn transitive(edge_id: Entity, node_a: Entity, node_b: Entity) -> Self {
        Self {
            edge_id,
            node_a,
            node_b,
            flag: EdgeFlag::Transitive,
        }
    }

    /// Edge anchored only at node B
    pub fn a_terminal(edge_id: Entity, node_b: Entity) -> Self {
        Self {
            edge_id,
            node_a: Entity::INVALID,
            node_b,
            flag: EdgeFlag::ANodeTerminal,
        }
    }

    /// Recompute the flag from endpoint validity
    ///
    /// Called after an endpoint has been invalidated by node removal.
    pub fn refresh_flag(&mut self) {
        self.flag = match (self.node_a.is_valid(), self.node_b.is_valid()) {
            (false, false) => EdgeFlag::Null,
            (false, true) => EdgeFlag::ANodeTerminal,
            (true, false) => EdgeFlag::BNodeTerminal,
            (true, true) => EdgeFlag::Transitive,
        };
    }

    /// Drop any reference to `node`, refreshing the flag
    ///
    /// Returns true if an endpoint was invalidated.
    pub fn detach_node(&mut self, node: Entity) -> bool {
        let mut touched = false;
        if self.node_a == node {
            self.node_a = Entity::INVALID;
            touched = true;
        }
        if self.node_b == node {
            self.node_b = Entity::INVALID;
            touched = true;
        }
        if touched {
            self.refresh_flag();
        }
        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_flags() {
        let edge = Edge::transitive(Entity(2), Entity(0), Entity(1));
        assert_eq!(edge.flag, EdgeFlag::Transitive);

        let half = Edge::a_terminal(Entity(2), Entity(1));
        assert_eq!(half.node_a, Entity::INVALID);
        assert_eq!(half.flag, EdgeFlag::ANodeTerminal);
    }

    #[test]
    fn detach_follows_truth_table() {
        let mut edge = Edge::transitive(Entity(2), Entity(0), Entity(1));

        assert!(edge.detach_node(Entity(0)));
        assert_eq!(edge.node_a, Entity::INVALID);
        assert_eq!(edge.node_b, Entity(1));
        assert_eq!(edge.flag, EdgeFlag::ANodeTerminal);

        assert!(edge.detach_node(Entity(1)));
        assert_eq!(edge.node_b, Entity::INVALID);
        assert_eq!(edge.flag, EdgeFlag::Null);

        // Unreferenced nodes leave the edge alone
        let mut other = Edge::transitive(Entity(5), Entity(3), Entity(4));
        assert!(!other.detach_node(Entity(0)));
        assert_eq!(other.flag, EdgeFlag::Transitive);
    }

    #[test]
    fn self_loop_detaches_both_ends() {
        let mut edge = Edge::transitive(Entity(2), Entity(7), Entity(7));
        assert!(edge.detach_node(Entity(7)));
        assert_eq!(edge.node_a, Entity::INVALID);
        assert_eq!(edge.node_b, Entity::INVALID);
        assert_eq!(edge.flag, EdgeFlag::Null);
    }

    #[test]
    fn b_terminal_from_refresh() {
        let mut edge = Edge {
            edge_id: Entity(9),
            node_a: Entity(1),
            node_b: Entity::INVALID,
            flag: EdgeFlag::Transitive,
        };
        edge.refresh_flag();
        assert_eq!(edge.flag, EdgeFlag::BNodeTerminal);
    }
}
