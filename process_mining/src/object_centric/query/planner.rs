//! Path enumeration, sub-query ordering, and OR-split/OR-join resolution over a graphical
//! query diagram (§4.E).
//!
//! A query graph is a node/edge diagram in which nodes carry atomic predicates
//! ([`ActivityQuery`]/[`ObjectTypeQuery`]) or mark an OR-split/OR-join branch point, and edges
//! optionally carry a control-flow relation (DF/EF) plus constraint, lifted onto the
//! synthesized [`ControlFlowQuery`] between the two nearest real predicate nodes they connect.
//! The planner compiles the whole diagram down to a single [`Query`], which the existing
//! [`super::evaluator::Evaluator`] then runs unmodified — its AND short-circuit already gives
//! the "drop as soon as empty" early termination described in §4.E point 5.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::all_simple_paths;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use super::ast::{ActivityQuery, ConstraintComponent, ControlFlowQuery, ObjectTypeQuery, Query, TemporalRelation, ObjectTypeRef};
use super::error::ConversionError;
use super::log_index::LogIndex;

/// A node of a query graph: either an atomic predicate or an OR-split/OR-join marker
#[derive(Debug, Clone)]
pub enum PlanNodeKind {
    /// An [`ActivityQuery`] predicate
    Activity(ActivityQuery),
    /// An [`ObjectTypeQuery`] predicate
    ObjectType(ObjectTypeQuery),
    /// An OR-split branch point
    OrSplit,
    /// An OR-join branch point
    OrJoin,
}

/// One node of a [`QueryGraph`]
#[derive(Debug, Clone)]
pub struct PlanNode {
    /// Diagram-local identifier
    pub id: String,
    /// The node's kind
    pub kind: PlanNodeKind,
}

/// One edge of a [`QueryGraph`]. `relation`/`constraint` are only meaningful when the edge
/// directly expresses a control-flow predicate between two real nodes; edges that merely route
/// through an OR-split/OR-join carry `relation: None`.
#[derive(Debug, Clone)]
pub struct PlanEdge {
    /// Source node id
    pub source: String,
    /// Target node id
    pub target: String,
    /// The temporal relation this edge expresses, if any
    pub relation: Option<TemporalRelation>,
    /// The constraint attached to this edge's control-flow predicate
    pub constraint: ConstraintComponent,
}

/// A graphical query: node/edge diagram with possible OR-split/OR-join subgraphs
#[derive(Debug, Clone, Default)]
pub struct QueryGraph {
    /// The graph's nodes
    pub nodes: Vec<PlanNode>,
    /// The graph's edges
    pub edges: Vec<PlanEdge>,
}

/// Whether the ordering heuristic of §4.E point 3 is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    /// Apply the unique-node and path ordering heuristic
    Exact,
    /// Compile the graph without reordering (diagram order is preserved)
    Simple,
}

struct Built {
    graph: DiGraph<usize, usize>, // node weight: index into `nodes`; edge weight: index into `edges`
}

fn build_petgraph(qg: &QueryGraph) -> (Built, HashMap<&str, NodeIndex>) {
    let mut graph = DiGraph::new();
    let mut index_of: HashMap<&str, NodeIndex> = HashMap::new();
    for (i, n) in qg.nodes.iter().enumerate() {
        let idx = graph.add_node(i);
        index_of.insert(n.id.as_str(), idx);
    }
    for (ei, e) in qg.edges.iter().enumerate() {
        if let (Some(&s), Some(&t)) = (index_of.get(e.source.as_str()), index_of.get(e.target.as_str())) {
            graph.add_edge(s, t, ei);
        }
    }
    (Built { graph }, index_of)
}

fn total_object_count(log_index: &LogIndex, object_type: &str) -> usize {
    log_index
        .execution_indices()
        .filter_map(|idx| log_index.execution(idx))
        .map(|pe| pe.objects(object_type).len())
        .sum()
}

fn object_type_name(ot: &ObjectTypeRef) -> Option<&str> {
    match ot {
        ObjectTypeRef::Named { name } => Some(name.as_str()),
        _ => None,
    }
}

fn node_to_query(node: &PlanNode) -> Option<Query> {
    match &node.kind {
        PlanNodeKind::Activity(aq) => Some(Query::Activity(aq.clone())),
        PlanNodeKind::ObjectType(otq) => Some(Query::ObjectType(otq.clone())),
        PlanNodeKind::OrSplit | PlanNodeKind::OrJoin => None,
    }
}

/// Compile a [`QueryGraph`] into a single [`Query`].
///
/// `log_index` supplies object-type cardinalities for the exact-mode ordering heuristic; pass
/// any indexed log (ordering only affects short-circuit efficiency, never the truth value).
pub fn plan(qg: &QueryGraph, log_index: &LogIndex, mode: PlanMode) -> Result<Query, ConversionError> {
    if qg.nodes.is_empty() {
        return Err(ConversionError::MissingField("nodes".to_string()));
    }
    let (built, index_of) = build_petgraph(qg);
    let graph = &built.graph;

    let unique_nodes: Vec<&PlanNode> = qg
        .nodes
        .iter()
        .filter(|n| {
            let idx = index_of[n.id.as_str()];
            graph.neighbors_directed(idx, Direction::Incoming).count() == 0
                && graph.neighbors_directed(idx, Direction::Outgoing).count() == 0
        })
        .collect();

    let sources: Vec<NodeIndex> = qg
        .nodes
        .iter()
        .filter(|n| {
            let idx = index_of[n.id.as_str()];
            graph.neighbors_directed(idx, Direction::Incoming).count() == 0
                && graph.neighbors_directed(idx, Direction::Outgoing).count() > 0
        })
        .map(|n| index_of[n.id.as_str()])
        .collect();
    let sinks: BTreeSet<NodeIndex> = qg
        .nodes
        .iter()
        .filter(|n| {
            let idx = index_of[n.id.as_str()];
            graph.neighbors_directed(idx, Direction::Outgoing).count() == 0
                && graph.neighbors_directed(idx, Direction::Incoming).count() > 0
        })
        .map(|n| index_of[n.id.as_str()])
        .collect();

    let mut raw_paths: Vec<Vec<NodeIndex>> = Vec::new();
    for &s in &sources {
        for &t in &sinks {
            if s == t {
                continue;
            }
            for path in all_simple_paths::<Vec<_>, _>(graph, s, t, 0, None) {
                raw_paths.push(path);
            }
        }
    }
    // A graph with no distinct source/sink pair (e.g. a single cycle-free chain with both
    // endpoints only touched once) still needs its sole path enumerated explicitly.
    if raw_paths.is_empty() && sources.len() == 1 && sinks.len() == 1 {
        let s = sources[0];
        if let Some(&t) = sinks.iter().next() {
            if s != t {
                raw_paths.extend(all_simple_paths::<Vec<_>, _>(graph, s, t, 0, None));
            }
        }
    }

    let mut paths: Vec<PathInfo> = raw_paths
        .into_iter()
        .map(|node_path| PathInfo::build(qg, &node_path))
        .collect();

    if mode == PlanMode::Exact {
        paths.sort_by_key(|p| (p.ef_count, p.object_type_cardinality(log_index), p.df_count, p.first_ef_position));
    }

    let path_queries: Vec<Query> = paths.iter().filter_map(|p| p.query.clone()).collect();

    let or_relations = compute_or_relations(&paths);
    let combined_paths = fold_or_relations(&paths, &path_queries, &or_relations);

    let mut unique_sorted = unique_nodes;
    if mode == PlanMode::Exact {
        unique_sorted.sort_by_key(|n| unique_node_sort_key(n, log_index));
    }
    let mut components: Vec<Query> = unique_sorted.into_iter().filter_map(node_to_query).collect();
    components.extend(combined_paths);

    Query::and_all(components).ok_or_else(|| ConversionError::MissingField("query graph".to_string()))
}

fn unique_node_sort_key(node: &PlanNode, log_index: &LogIndex) -> (u8, usize) {
    match &node.kind {
        PlanNodeKind::ObjectType(otq) => {
            let count = object_type_name(&otq.component.object_type)
                .map(|ot| total_object_count(log_index, ot))
                .unwrap_or(usize::MAX);
            (0, count)
        }
        PlanNodeKind::Activity(aq) => {
            let count = object_type_name(&aq.object_component.object_type)
                .map(|ot| total_object_count(log_index, ot))
                .unwrap_or(usize::MAX);
            (1, count)
        }
        PlanNodeKind::OrSplit | PlanNodeKind::OrJoin => (2, usize::MAX),
    }
}

/// One enumerated source-to-sink path, with its synthesized predicate sequence and the
/// OR-split/OR-join ids it passes through.
struct PathInfo {
    query: Option<Query>,
    splits: BTreeSet<String>,
    joins: BTreeSet<String>,
    next_real_after: HashMap<String, Option<String>>,
    prev_real_before: HashMap<String, Option<String>>,
    ef_count: usize,
    df_count: usize,
    first_ef_position: usize,
    /// Object type referenced by this path's first real node, used for the ordering heuristic
    lead_object_type: Option<String>,
}

impl PathInfo {
    fn build(qg: &QueryGraph, node_path: &[NodeIndex]) -> Self {
        let nodes: Vec<&PlanNode> = node_path.iter().map(|&ni| &qg.nodes[ni.index()]).collect();
        let edge_by_pair: HashMap<(&str, &str), &PlanEdge> = qg
            .edges
            .iter()
            .map(|e| ((e.source.as_str(), e.target.as_str()), e))
            .collect();

        let mut splits = BTreeSet::new();
        let mut joins = BTreeSet::new();
        let mut next_real_after = HashMap::new();
        let mut prev_real_before = HashMap::new();
        for (i, n) in nodes.iter().enumerate() {
            match n.kind {
                PlanNodeKind::OrSplit => {
                    splits.insert(n.id.clone());
                    let next_real = nodes[i + 1..]
                        .iter()
                        .find(|m| !matches!(m.kind, PlanNodeKind::OrSplit | PlanNodeKind::OrJoin))
                        .map(|m| m.id.clone());
                    next_real_after.insert(n.id.clone(), next_real);
                }
                PlanNodeKind::OrJoin => {
                    joins.insert(n.id.clone());
                    let prev_real = nodes[..i]
                        .iter()
                        .rev()
                        .find(|m| !matches!(m.kind, PlanNodeKind::OrSplit | PlanNodeKind::OrJoin))
                        .map(|m| m.id.clone());
                    prev_real_before.insert(n.id.clone(), prev_real);
                }
                _ => {}
            }
        }

        let real_positions: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !matches!(n.kind, PlanNodeKind::OrSplit | PlanNodeKind::OrJoin))
            .map(|(i, _)| i)
            .collect();

        let mut predicates: Vec<Query> = Vec::new();
        for &i in &real_positions {
            if let Some(q) = node_to_query(nodes[i]) {
                predicates.push(q);
            }
        }

        let mut ef_count = 0;
        let mut df_count = 0;
        let mut first_ef_position = usize::MAX;
        for w in real_positions.windows(2) {
            let (ia, ib) = (w[0], w[1]);
            let (a, b) = (nodes[ia], nodes[ib]);
            let (first_aq, second_aq) = match (&a.kind, &b.kind) {
                (PlanNodeKind::Activity(fa), PlanNodeKind::Activity(sa)) => (fa.clone(), sa.clone()),
                _ => continue,
            };
            // Look up the edge directly joining the two real nodes in this path; when they are
            // separated by OR-nodes, use the edge touching the real node closest to each side.
            let edge = edge_by_pair
                .get(&(a.id.as_str(), b.id.as_str()))
                .or_else(|| {
                    nodes[ia..=ib]
                        .windows(2)
                        .find_map(|pair| edge_by_pair.get(&(pair[0].id.as_str(), pair[1].id.as_str())))
                })
                .copied();
            let (relation, constraint) = match edge {
                Some(e) => (e.relation.unwrap_or(TemporalRelation::DirectlyFollows), e.constraint),
                None => (TemporalRelation::DirectlyFollows, ConstraintComponent::default()),
            };
            match relation {
                TemporalRelation::EventuallyFollows => {
                    ef_count += 1;
                    first_ef_position = first_ef_position.min(ia);
                }
                TemporalRelation::DirectlyFollows => df_count += 1,
            }
            predicates.push(Query::ControlFlow(Box::new(ControlFlowQuery {
                first: first_aq,
                second: second_aq,
                relation,
                constraint,
                metric_filter: None,
            })));
        }

        let lead_object_type = real_positions.first().and_then(|&i| match &nodes[i].kind {
            PlanNodeKind::Activity(aq) => object_type_name(&aq.object_component.object_type).map(str::to_string),
            PlanNodeKind::ObjectType(otq) => object_type_name(&otq.component.object_type).map(str::to_string),
            _ => None,
        });

        PathInfo {
            query: Query::and_all(predicates),
            splits,
            joins,
            next_real_after,
            prev_real_before,
            ef_count,
            df_count,
            first_ef_position,
            lead_object_type,
        }
    }

    fn object_type_cardinality(&self, log_index: &LogIndex) -> usize {
        self.lead_object_type
            .as_deref()
            .map(|ot| total_object_count(log_index, ot))
            .unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairRelation {
    And,
    Or,
}

/// Determine the pairwise AND/OR relation between every pair of paths, per the four rules of
/// §4.E point 4. Pairs sharing no OR-node at all default to AND (same fallback the Converter
/// uses for otherwise-unconnected query nodes).
fn compute_or_relations(paths: &[PathInfo]) -> HashMap<(usize, usize), PairRelation> {
    let mut relations = HashMap::new();
    for i in 0..paths.len() {
        for j in (i + 1)..paths.len() {
            let a = &paths[i];
            let b = &paths[j];
            let shared_splits: BTreeSet<&String> = a.splits.intersection(&b.splits).collect();
            let shared_joins: BTreeSet<&String> = a.joins.intersection(&b.joins).collect();

            let relation = if !shared_splits.is_empty() && !shared_joins.is_empty() {
                PairRelation::Or
            } else if let Some(&split) = shared_splits.iter().next() {
                let same_next = a.next_real_after.get(split.as_str()) == b.next_real_after.get(split.as_str());
                if same_next {
                    PairRelation::And
                } else {
                    PairRelation::Or
                }
            } else if let Some(&join) = shared_joins.iter().next() {
                let same_prev = a.prev_real_before.get(join.as_str()) == b.prev_real_before.get(join.as_str());
                if same_prev {
                    PairRelation::And
                } else {
                    PairRelation::Or
                }
            } else {
                PairRelation::And
            };
            relations.insert((i, j), relation);
        }
    }
    relations
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }
    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }
    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Fold pairwise AND/OR relations into a final list of composed sub-queries: AND-groups first
/// (intersecting index sets), then OR across the resulting groups, per §4.E point 4's
/// "apply in that order" rule.
fn fold_or_relations(
    paths: &[PathInfo],
    path_queries: &[Query],
    relations: &HashMap<(usize, usize), PairRelation>,
) -> Vec<Query> {
    if paths.is_empty() {
        return Vec::new();
    }
    let mut and_uf = UnionFind::new(paths.len());
    for (&(i, j), rel) in relations {
        if *rel == PairRelation::And {
            and_uf.union(i, j);
        }
    }
    let mut and_groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..paths.len() {
        and_groups.entry(and_uf.find(i)).or_default().push(i);
    }

    let mut or_uf = UnionFind::new(paths.len());
    for (&(i, j), rel) in relations {
        if *rel == PairRelation::Or {
            or_uf.union(and_uf.find(i), and_uf.find(j));
        }
    }
    let mut or_groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for &rep in and_groups.keys() {
        or_groups.entry(or_uf.find(rep)).or_default().push(rep);
    }

    let mut result = Vec::new();
    for (_or_rep, and_reps) in or_groups {
        let or_members: Vec<Query> = and_reps
            .into_iter()
            .filter_map(|and_rep| {
                let mut members = and_groups[&and_rep].clone();
                members.sort_unstable();
                Query::and_all(members.into_iter().map(|i| path_queries[i].clone()).collect())
            })
            .collect();
        if let Some(q) = Query::or_all(or_members) {
            result.push(q);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_centric::query::ast::{
        ActivityComponent, ActivityKind, ObjectComponent, ObjectTypeComponent, ObjectTypeRef,
    };
    use crate::ocel::linked_ocel::IndexLinkedOCEL;
    use crate::ocel::ocel_struct::OCEL;

    fn empty_log_index() -> LogIndex {
        let ocel = OCEL {
            event_types: vec![],
            object_types: vec![],
            events: vec![],
            objects: vec![],
        };
        let locel = IndexLinkedOCEL::from_ocel(ocel);
        LogIndex::build(&locel, vec![], &super::super::log_index::ExecutionGraph::chain_by_time)
    }

    fn activity_node(id: &str, object_type: &str, activity: &str) -> PlanNode {
        PlanNode {
            id: id.to_string(),
            kind: PlanNodeKind::Activity(ActivityQuery {
                object_component: ObjectComponent {
                    object_type: ObjectTypeRef::Named {
                        name: object_type.to_string(),
                    },
                    cardinality: None,
                },
                activity_component: ActivityComponent {
                    kind: ActivityKind::Single {
                        activities: vec![activity.to_string()],
                    },
                    metric_filter: None,
                },
            }),
        }
    }

    #[test]
    fn linear_chain_synthesizes_control_flow() {
        let qg = QueryGraph {
            nodes: vec![
                activity_node("a", "item", "Pick"),
                activity_node("b", "item", "Pack"),
            ],
            edges: vec![PlanEdge {
                source: "a".to_string(),
                target: "b".to_string(),
                relation: Some(TemporalRelation::DirectlyFollows),
                constraint: ConstraintComponent::default(),
            }],
        };
        let log_index = empty_log_index();
        let q = plan(&qg, &log_index, PlanMode::Simple).unwrap();
        // and_all folds left-associatively: [Activity(a), Activity(b), ControlFlow] becomes
        // And(And(a, b), control_flow).
        match q {
            Query::And(l, r) => {
                assert!(matches!(*r, Query::ControlFlow(_)));
                match *l {
                    Query::And(ll, rr) => {
                        assert!(matches!(*ll, Query::Activity(_)));
                        assert!(matches!(*rr, Query::Activity(_)));
                    }
                    _ => panic!("expected nested AND of the two activity predicates"),
                }
            }
            _ => panic!("expected AND composition"),
        }
    }

    #[test]
    fn or_split_join_combines_alternative_paths_with_or() {
        let qg = QueryGraph {
            nodes: vec![
                activity_node("a", "order", "Create PO"),
                PlanNode {
                    id: "split".to_string(),
                    kind: PlanNodeKind::OrSplit,
                },
                activity_node("b1", "order", "Approve"),
                activity_node("b2", "order", "Reject"),
                PlanNode {
                    id: "join".to_string(),
                    kind: PlanNodeKind::OrJoin,
                },
                activity_node("c", "order", "Close"),
            ],
            edges: vec![
                PlanEdge {
                    source: "a".to_string(),
                    target: "split".to_string(),
                    relation: None,
                    constraint: ConstraintComponent::default(),
                },
                PlanEdge {
                    source: "split".to_string(),
                    target: "b1".to_string(),
                    relation: None,
                    constraint: ConstraintComponent::default(),
                },
                PlanEdge {
                    source: "split".to_string(),
                    target: "b2".to_string(),
                    relation: None,
                    constraint: ConstraintComponent::default(),
                },
                PlanEdge {
                    source: "b1".to_string(),
                    target: "join".to_string(),
                    relation: None,
                    constraint: ConstraintComponent::default(),
                },
                PlanEdge {
                    source: "b2".to_string(),
                    target: "join".to_string(),
                    relation: None,
                    constraint: ConstraintComponent::default(),
                },
                PlanEdge {
                    source: "join".to_string(),
                    target: "c".to_string(),
                    relation: None,
                    constraint: ConstraintComponent::default(),
                },
            ],
        };
        let log_index = empty_log_index();
        let q = plan(&qg, &log_index, PlanMode::Simple).unwrap();
        // The two branch paths (through b1 and b2) share both the split and the join, so they
        // must be OR-combined somewhere in the compiled tree.
        fn contains_or(q: &Query) -> bool {
            match q {
                Query::Or(_, _) => true,
                Query::And(l, r) => contains_or(l) || contains_or(r),
                Query::Not(inner) => contains_or(inner),
                _ => false,
            }
        }
        assert!(contains_or(&q));
    }

    #[test]
    fn unique_object_type_node_has_no_path() {
        let qg = QueryGraph {
            nodes: vec![PlanNode {
                id: "ot".to_string(),
                kind: PlanNodeKind::ObjectType(ObjectTypeQuery {
                    component: ObjectTypeComponent {
                        object_type: ObjectTypeRef::Named {
                            name: "order".to_string(),
                        },
                        cardinality: None,
                    },
                }),
            }],
            edges: vec![],
        };
        let log_index = empty_log_index();
        let q = plan(&qg, &log_index, PlanMode::Exact).unwrap();
        assert!(matches!(q, Query::ObjectType(_)));
    }
}
