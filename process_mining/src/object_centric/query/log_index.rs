use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::ocel::linked_ocel::index_linked_ocel::{EventIndex, ObjectIndex};
use crate::ocel::linked_ocel::{IndexLinkedOCEL, LinkedOCELAccess};

/// The pseudo object type referring to the union of all object types of a process execution
pub const ANY_OBJECT_TYPE: &str = "ANY";

/// Index of a process execution within a [`LogIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExecutionIndex(pub usize);

/// The annotated execution graph `G_P` of one process execution
///
/// Nodes are the events of the execution; edge weights are the set of object ids that
/// traverse that edge, computed by per-object-type projected succession (see
/// [`ExecutionGraph::annotate_edges`]), not by intersecting node object sets.
#[derive(Debug, Clone)]
pub struct ExecutionGraph {
    graph: DiGraph<EventIndex, BTreeSet<ObjectIndex>>,
    node_of_event: HashMap<EventIndex, NodeIndex>,
}

impl ExecutionGraph {
    /// Build an empty graph over the given events, with no edges yet.
    fn with_nodes(events: impl IntoIterator<Item = EventIndex>) -> Self {
        let mut graph = DiGraph::new();
        let mut node_of_event = HashMap::new();
        for ev in events {
            let n = graph.add_node(ev);
            node_of_event.insert(ev, n);
        }
        Self {
            graph,
            node_of_event,
        }
    }

    /// Default execution graph constructor: chains the execution's events into a single
    /// path, ordered by `(time, id)`.
    ///
    /// This is a convenience for callers that do not supply a richer, concurrency-preserving
    /// extraction of the process execution's control flow; a caller with a real DAG should
    /// build an [`ExecutionGraph`] directly instead.
    pub fn chain_by_time(locel: &IndexLinkedOCEL, events: &BTreeSet<EventIndex>) -> Self {
        let mut sorted: Vec<EventIndex> = events.iter().copied().collect();
        sorted.sort_by_key(|ev| {
            let e = locel.get_ev(ev);
            (e.time, ev.clone())
        });
        let mut g = Self::with_nodes(sorted.iter().copied());
        for pair in sorted.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            g.add_edge(from, to);
        }
        g
    }

    fn add_edge(&mut self, from: EventIndex, to: EventIndex) {
        let a = self.node_of_event[&from];
        let b = self.node_of_event[&to];
        self.graph.add_edge(a, b, BTreeSet::new());
    }

    /// All events (nodes) of this execution graph
    pub fn nodes(&self) -> impl Iterator<Item = EventIndex> + '_ {
        self.node_of_event.keys().copied()
    }

    /// Whether there is a direct edge `from -> to`
    pub fn has_edge(&self, from: EventIndex, to: EventIndex) -> bool {
        match (self.node_of_event.get(&from), self.node_of_event.get(&to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Whether there is a directed path `from -> to` (including the trivial `from == to` case
    /// only if a self-loop edge exists; a plain reachability query otherwise)
    pub fn has_path(&self, from: EventIndex, to: EventIndex) -> bool {
        match (self.node_of_event.get(&from), self.node_of_event.get(&to)) {
            (Some(&a), Some(&b)) => has_path_connecting(&self.graph, a, b, None),
            _ => false,
        }
    }

    /// The set of object ids annotated on edge `from -> to`, if that edge exists
    pub fn edge_objects(&self, from: EventIndex, to: EventIndex) -> Option<&BTreeSet<ObjectIndex>> {
        let a = *self.node_of_event.get(&from)?;
        let b = *self.node_of_event.get(&to)?;
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge)
    }

    /// One shortest directed path of events from `from` to `to`, via BFS predecessor
    /// reconstruction (see DESIGN.md Open Question resolution on EF witnesses).
    pub fn shortest_path(&self, from: EventIndex, to: EventIndex) -> Option<Vec<EventIndex>> {
        let a = *self.node_of_event.get(&from)?;
        let b = *self.node_of_event.get(&to)?;
        self.bfs_shortest(a, b)
    }

    fn bfs_shortest(&self, start: NodeIndex, goal: NodeIndex) -> Option<Vec<EventIndex>> {
        use std::collections::VecDeque;
        let mut visited = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited.insert(start, None);
        while let Some(cur) = queue.pop_front() {
            if cur == goal {
                let mut path = vec![cur];
                let mut at = cur;
                while let Some(Some(prev)) = visited.get(&at) {
                    path.push(*prev);
                    at = *prev;
                }
                path.reverse();
                return Some(path.into_iter().map(|n| self.graph[n]).collect());
            }
            for next in self.graph.neighbors_directed(cur, Direction::Outgoing) {
                #[allow(clippy::map_entry)]
                if !visited.contains_key(&next) {
                    visited.insert(next, Some(cur));
                    queue.push_back(next);
                }
            }
        }
        None
    }

    /// Record that object `ob` traverses edge `from -> to`, if that edge exists.
    fn annotate_edge_object(&mut self, from: EventIndex, to: EventIndex, ob: ObjectIndex) {
        if let (Some(&a), Some(&b)) = (self.node_of_event.get(&from), self.node_of_event.get(&to))
        {
            if let Some(edge) = self.graph.find_edge(a, b) {
                self.graph[edge].insert(ob);
            }
        }
    }
}

/// Per-execution index: object lists by type, the annotated execution graph, and the
/// flattened object list (the `ANY` pseudo type).
#[derive(Debug, Clone)]
pub struct ProcessExecutionIndex {
    /// All event ids belonging to this execution
    pub events: BTreeSet<EventIndex>,
    /// Objects of this execution, grouped by object type
    pub objects_by_type: BTreeMap<String, Vec<ObjectIndex>>,
    /// Concatenation of `objects_by_type`'s values, deduplicated; backs the `ANY` pseudo type
    pub objects_flattened: Vec<ObjectIndex>,
    /// The annotated execution graph `G_P`
    pub graph: ExecutionGraph,
}

impl ProcessExecutionIndex {
    /// Objects of the given type (or the flattened list, for [`ANY_OBJECT_TYPE`])
    pub fn objects(&self, object_type: &str) -> &[ObjectIndex] {
        if object_type == ANY_OBJECT_TYPE {
            &self.objects_flattened
        } else {
            self.objects_by_type
                .get(object_type)
                .map(|v| v.as_slice())
                .unwrap_or(&[])
        }
    }

    /// Object types present (with at least one object) in this execution
    pub fn object_types(&self) -> impl Iterator<Item = &str> + '_ {
        self.objects_by_type.keys().map(|s| s.as_str())
    }
}

/// The log-wide index: total `event -> activity` map, its inverse, and one
/// [`ProcessExecutionIndex`] per process execution.
///
/// Built once per `(OCEL, extraction settings)` pair (see the caching layer in
/// [`super::driver`]); immutable and safely shareable across concurrent evaluations.
#[derive(Debug, Clone)]
pub struct LogIndex {
    event_activity: HashMap<EventIndex, String>,
    activity_events: HashMap<String, Vec<EventIndex>>,
    executions: Vec<ProcessExecutionIndex>,
}

impl LogIndex {
    /// Build a [`LogIndex`] over the given process executions.
    ///
    /// `executions` and `graph_builder` are external inputs (variant calculation and
    /// execution extraction are out of scope here): `graph_builder` receives the log and one
    /// execution's event set and returns its DAG. Use [`ExecutionGraph::chain_by_time`] as a
    /// default when no richer extraction is available.
    pub fn build(
        locel: &IndexLinkedOCEL,
        executions: Vec<BTreeSet<EventIndex>>,
        graph_builder: impl Fn(&IndexLinkedOCEL, &BTreeSet<EventIndex>) -> ExecutionGraph,
    ) -> Self {
        let mut event_activity = HashMap::new();
        let mut activity_events: HashMap<String, Vec<EventIndex>> = HashMap::new();
        for ev in locel.get_all_evs_ref() {
            let activity = locel.get_ev(ev).event_type.clone();
            event_activity.insert(*ev, activity.clone());
            activity_events.entry(activity).or_default().push(*ev);
        }
        for events in activity_events.values_mut() {
            events.sort_by_key(|ev| (locel.get_ev(ev).time, *ev));
        }

        let executions: Vec<ProcessExecutionIndex> = executions
            .into_iter()
            .map(|events| Self::build_execution(locel, events, &graph_builder))
            .collect();

        Self {
            event_activity,
            activity_events,
            executions,
        }
    }

    fn build_execution(
        locel: &IndexLinkedOCEL,
        events: BTreeSet<EventIndex>,
        graph_builder: &impl Fn(&IndexLinkedOCEL, &BTreeSet<EventIndex>) -> ExecutionGraph,
    ) -> ProcessExecutionIndex {
        let mut graph = graph_builder(locel, &events);

        let mut objects_by_type: BTreeMap<String, BTreeSet<ObjectIndex>> = BTreeMap::new();
        for ev in &events {
            for (_qualifier, ob) in locel.get_e2o(ev) {
                let ob_type = locel.get_ob(ob).object_type.clone();
                objects_by_type.entry(ob_type).or_default().insert(*ob);
            }
        }
        let objects_by_type: BTreeMap<String, Vec<ObjectIndex>> = objects_by_type
            .into_iter()
            .map(|(ot, obs)| (ot, obs.into_iter().collect()))
            .collect();

        let mut objects_flattened: Vec<ObjectIndex> =
            objects_by_type.values().flatten().copied().collect();
        objects_flattened.sort();
        objects_flattened.dedup();

        // Per-object-type projected succession (see §3): for every object touching this
        // execution, order its own events by (time, id) and annotate each consecutive pair
        // onto the corresponding existing graph edge. A naive `source.objects ∩
        // target.objects` is not used here since it over-approximates when an object
        // touches both ends of an edge without its own trace actually crossing it.
        for obs in objects_by_type.values() {
            for &ob in obs {
                let mut ob_events: Vec<EventIndex> = locel
                    .get_e2o_rev(&ob)
                    .map(|(_q, ev)| *ev)
                    .filter(|ev| events.contains(ev))
                    .collect();
                ob_events.sort_by_key(|ev| (locel.get_ev(ev).time, *ev));
                ob_events.dedup();
                for pair in ob_events.windows(2) {
                    graph.annotate_edge_object(pair[0], pair[1], ob);
                }
            }
        }

        ProcessExecutionIndex {
            events,
            objects_by_type,
            objects_flattened,
            graph,
        }
    }

    /// The activity of an event (total over all events of the log)
    pub fn event_activity(&self, ev: EventIndex) -> Option<&str> {
        self.event_activity.get(&ev).map(|s| s.as_str())
    }

    /// All events of the given activity, ordered by `(time, id)`
    pub fn activity_events(&self, activity: &str) -> &[EventIndex] {
        self.activity_events
            .get(activity)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of process executions indexed
    pub fn execution_count(&self) -> usize {
        self.executions.len()
    }

    /// The [`ProcessExecutionIndex`] for a given execution, if in range
    pub fn execution(&self, idx: ExecutionIndex) -> Option<&ProcessExecutionIndex> {
        self.executions.get(idx.0)
    }

    /// Iterate over all execution indices
    pub fn execution_indices(&self) -> impl Iterator<Item = ExecutionIndex> {
        (0..self.executions.len()).map(ExecutionIndex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocel::ocel_struct::{OCELEvent, OCELObject, OCELRelationship, OCELType, OCEL};
    use chrono::{DateTime, FixedOffset};

    fn t(secs: i64) -> DateTime<FixedOffset> {
        DateTime::from_timestamp(secs, 0).unwrap().fixed_offset()
    }

    fn rel(object_id: &str, qualifier: &str) -> OCELRelationship {
        OCELRelationship {
            object_id: object_id.to_string(),
            qualifier: qualifier.to_string(),
        }
    }

    fn sample_ocel() -> OCEL {
        OCEL {
            event_types: vec![
                OCELType {
                    name: "Pick".to_string(),
                    attributes: vec![],
                },
                OCELType {
                    name: "Pack".to_string(),
                    attributes: vec![],
                },
            ],
            object_types: vec![OCELType {
                name: "item".to_string(),
                attributes: vec![],
            }],
            events: vec![
                OCELEvent {
                    id: "e1".to_string(),
                    event_type: "Pick".to_string(),
                    time: t(0),
                    attributes: vec![],
                    relationships: vec![rel("i1", "item")],
                },
                OCELEvent {
                    id: "e2".to_string(),
                    event_type: "Pack".to_string(),
                    time: t(10),
                    attributes: vec![],
                    relationships: vec![rel("i1", "item")],
                },
            ],
            objects: vec![OCELObject {
                id: "i1".to_string(),
                object_type: "item".to_string(),
                attributes: vec![],
                relationships: vec![],
            }],
        }
    }

    #[test]
    fn objects_subset_of_flattened() {
        let ocel = sample_ocel();
        let locel = IndexLinkedOCEL::from_ocel(ocel);
        let all_events: BTreeSet<EventIndex> = locel.get_all_evs_ref().copied().collect();
        let idx = LogIndex::build(&locel, vec![all_events], &ExecutionGraph::chain_by_time);
        let pe = idx.execution(ExecutionIndex(0)).unwrap();
        for ot in pe.object_types() {
            for ob in pe.objects(ot) {
                assert!(pe.objects_flattened.contains(ob));
            }
        }
    }

    #[test]
    fn edge_objects_match_projected_succession() {
        let ocel = sample_ocel();
        let locel = IndexLinkedOCEL::from_ocel(ocel);
        let all_events: BTreeSet<EventIndex> = locel.get_all_evs_ref().copied().collect();
        let idx = LogIndex::build(&locel, vec![all_events], &ExecutionGraph::chain_by_time);
        let pe = idx.execution(ExecutionIndex(0)).unwrap();
        let evs: Vec<EventIndex> = {
            let mut v: Vec<_> = pe.events.iter().copied().collect();
            v.sort_by_key(|e| (locel.get_ev(e).time, *e));
            v
        };
        assert!(pe.graph.has_edge(evs[0], evs[1]));
        let objs = pe.graph.edge_objects(evs[0], evs[1]).unwrap();
        assert_eq!(objs.len(), 1);
    }
}
