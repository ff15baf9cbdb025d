use std::collections::{BTreeMap, BTreeSet};

use crate::ocel::linked_ocel::index_linked_ocel::{EventIndex, ObjectIndex};

/// The objects and events that justify a predicate being satisfied for one object type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectWitness {
    /// Object ids that satisfied the predicate
    pub objects: BTreeSet<ObjectIndex>,
    /// For each satisfying object, the event ids that justified it
    pub contributing_events: BTreeMap<ObjectIndex, BTreeSet<EventIndex>>,
}

/// Witness for a satisfied control-flow query: the qualifying edges of the execution graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeWitness {
    /// Edges `(from, to)` that contributed to the temporal mapping
    pub edges: BTreeSet<(EventIndex, EventIndex)>,
}

/// The full witness emitted alongside a `true` evaluation: the satisfied objects (by
/// object type), the satisfied edges (for control-flow queries), and a breakdown mirroring
/// the query's structure.
///
/// A query that evaluates to `true` for an execution always carries a complete witness for
/// that execution (witnesses are never partial).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Witness {
    /// Satisfied objects, grouped by object type (including the `ANY` pseudo type where
    /// relevant)
    pub satisfied_objects: BTreeMap<String, ObjectWitness>,
    /// Satisfied edges, present only for (sub-)queries involving a control-flow predicate
    pub satisfied_edges: EdgeWitness,
    /// Sub-witnesses of a composed query, in the same shape as the AST node they justify
    pub breakdown: Vec<Witness>,
}

impl Witness {
    /// A witness with a single object type's satisfied objects and no breakdown
    pub fn single_type(object_type: impl Into<String>, objects: ObjectWitness) -> Self {
        let mut satisfied_objects = BTreeMap::new();
        satisfied_objects.insert(object_type.into(), objects);
        Witness {
            satisfied_objects,
            satisfied_edges: EdgeWitness::default(),
            breakdown: Vec::new(),
        }
    }

    /// Merge two witnesses by union of their satisfied objects and edges, with both as
    /// sub-witnesses in the breakdown (used for AND/OR composition)
    pub fn union(mut self, other: Witness) -> Self {
        for (ot, ow) in other.satisfied_objects.iter() {
            let entry = self.satisfied_objects.entry(ot.clone()).or_default();
            entry.objects.extend(ow.objects.iter().copied());
            for (obj, evs) in ow.contributing_events.iter() {
                entry
                    .contributing_events
                    .entry(*obj)
                    .or_default()
                    .extend(evs.iter().copied());
            }
        }
        self.satisfied_edges
            .edges
            .extend(other.satisfied_edges.edges.iter().copied());
        self.breakdown.push(other);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_type_round_trips() {
        let mut ow = ObjectWitness::default();
        ow.objects.insert(ObjectIndex::from(0usize));
        let w = Witness::single_type("order", ow);
        assert!(w.satisfied_objects.contains_key("order"));
    }
}
