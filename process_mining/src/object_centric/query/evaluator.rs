use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::ocel::linked_ocel::index_linked_ocel::{EventIndex, ObjectIndex};
use crate::ocel::linked_ocel::{IndexLinkedOCEL, LinkedOCELAccess};

use super::ast::{
    ActivityKind, ActivityQuery, Cardinality, ConstraintComponent, ControlFlowQuery,
    ObjectTypeComponent, ObjectTypeQuery, ObjectTypeRef, Operator, Query, Quantifier,
    TemporalRelation,
};
use super::driver::QueryEngineConfig;
use super::error::EvalError;
use super::log_index::{ProcessExecutionIndex, ANY_OBJECT_TYPE};
use super::metrics::MetricSource;
use super::witness::{ObjectWitness, Witness};

/// Evaluates a [`Query`] against one [`ProcessExecutionIndex`].
///
/// Carries wildcard binding state (`wc_id -> set<ObjectType>`), which is local to one
/// top-level [`Evaluator::evaluate`] call and reset on the next one: bindings only ever
/// intersect, never widen, and a wildcard whose binding empties evaluates to unsatisfied
/// from then on within that call.
pub struct Evaluator<'a> {
    locel: &'a IndexLinkedOCEL,
    config: &'a QueryEngineConfig,
    metrics: Option<&'a dyn MetricSource>,
    wildcards: HashMap<String, BTreeSet<String>>,
}

impl<'a> Evaluator<'a> {
    /// Construct an evaluator for the given log and configuration
    pub fn new(
        locel: &'a IndexLinkedOCEL,
        config: &'a QueryEngineConfig,
        metrics: Option<&'a dyn MetricSource>,
    ) -> Self {
        Self {
            locel,
            config,
            metrics,
            wildcards: HashMap::new(),
        }
    }

    /// `Φ(q, p) -> bool`, with a witness on success. Resets wildcard state first.
    pub fn evaluate(
        &mut self,
        query: &Query,
        pe: &ProcessExecutionIndex,
    ) -> Result<(bool, Option<Witness>), EvalError> {
        self.wildcards.clear();
        let (ok, w) = self.eval(query, pe)?;
        Ok((ok, if ok { Some(w) } else { None }))
    }

    fn eval(&mut self, query: &Query, pe: &ProcessExecutionIndex) -> Result<(bool, Witness), EvalError> {
        match query {
            Query::Activity(aq) => {
                let (ok, _types, witness) = self.eval_activity_query(aq, pe)?;
                Ok((ok, witness))
            }
            Query::ObjectType(otq) => self.eval_object_type_query(otq, pe),
            Query::ControlFlow(cfq) => self.eval_control_flow_query(cfq, pe),
            Query::And(l, r) => {
                let (ok_l, w_l) = self.eval(l, pe)?;
                if !ok_l {
                    return Ok((false, Witness::default()));
                }
                let (ok_r, w_r) = self.eval(r, pe)?;
                Ok((ok_l && ok_r, w_l.union(w_r)))
            }
            Query::Or(l, r) => {
                let (ok_l, w_l) = self.eval(l, pe)?;
                let (ok_r, w_r) = self.eval(r, pe)?;
                match (ok_l, ok_r) {
                    (true, true) => Ok((true, w_l.union(w_r))),
                    (true, false) => Ok((true, w_l)),
                    (false, true) => Ok((true, w_r)),
                    (false, false) => Ok((false, Witness::default())),
                }
            }
            Query::Not(inner) => {
                let (ok, w) = self.eval(inner, pe)?;
                // NOT negates the truth value; the witness becomes the complement of the
                // satisfied objects (every object of the execution minus the ones the
                // inner query satisfied), per §4.D.
                Ok((!ok, self.complement_witness(&w, pe)))
            }
        }
    }

    fn complement_witness(&self, inner: &Witness, pe: &ProcessExecutionIndex) -> Witness {
        let mut satisfied_objects = BTreeMap::new();
        for ot in pe.object_types() {
            let all: BTreeSet<ObjectIndex> = pe.objects(ot).iter().copied().collect();
            let excluded = inner
                .satisfied_objects
                .get(ot)
                .map(|ow| ow.objects.clone())
                .unwrap_or_default();
            let remaining: BTreeSet<ObjectIndex> =
                all.difference(&excluded).copied().collect();
            satisfied_objects.insert(
                ot.to_string(),
                ObjectWitness {
                    objects: remaining,
                    contributing_events: BTreeMap::new(),
                },
            );
        }
        Witness {
            satisfied_objects,
            satisfied_edges: Default::default(),
            breakdown: vec![inner.clone()],
        }
    }

    /// Resolve an [`ObjectTypeRef`] to its current candidate object types (for `ANY`, every
    /// type present in the execution; for a wildcard, its current binding or, if unbound
    /// yet, every type present).
    fn candidate_types(&self, ot: &ObjectTypeRef, pe: &ProcessExecutionIndex) -> Vec<String> {
        match ot {
            ObjectTypeRef::Named { name } => vec![name.clone()],
            ObjectTypeRef::Any => pe.object_types().map(|s| s.to_string()).collect(),
            ObjectTypeRef::Wildcard { id } => match self.wildcards.get(id) {
                Some(bound) => bound.iter().cloned().collect(),
                None => pe.object_types().map(|s| s.to_string()).collect(),
            },
        }
    }

    /// Narrow (first-writer binds, subsequent reads intersect) a wildcard's binding to the
    /// types that satisfied the current predicate. No-op for non-wildcard refs.
    fn narrow_wildcard(&mut self, ot: &ObjectTypeRef, satisfying: &BTreeSet<String>) {
        if let ObjectTypeRef::Wildcard { id } = ot {
            let narrowed = match self.wildcards.get(id) {
                Some(existing) => existing.intersection(satisfying).cloned().collect(),
                None => satisfying.clone(),
            };
            self.wildcards.insert(id.clone(), narrowed);
        }
    }

    /// Evaluate an [`ActivityQuery`]; returns whether it holds, the set of object types
    /// that actually satisfied it (after any wildcard narrowing), and a combined witness.
    fn eval_activity_query(
        &mut self,
        q: &ActivityQuery,
        pe: &ProcessExecutionIndex,
    ) -> Result<(bool, BTreeSet<String>, Witness), EvalError> {
        let ot_ref = &q.object_component.object_type;
        let is_any = matches!(ot_ref, ObjectTypeRef::Any);
        let candidates = self.candidate_types(ot_ref, pe);

        let mut satisfying_types = BTreeSet::new();
        let mut combined = Witness::default();
        for ty in &candidates {
            if let Some((ok, witness)) = self.eval_activity_query_for_type(ty, q, pe) {
                if ok {
                    satisfying_types.insert(ty.clone());
                    combined = combined.union(Witness::single_type(ty.clone(), witness));
                }
            }
        }

        let raw_satisfying = satisfying_types.clone();
        let is_wildcard = matches!(ot_ref, ObjectTypeRef::Wildcard { .. });
        if is_wildcard {
            self.narrow_wildcard(ot_ref, &raw_satisfying);
            if let ObjectTypeRef::Wildcard { id } = ot_ref {
                satisfying_types = self.wildcards.get(id).cloned().unwrap_or_default();
            }
        }

        // ANY and wildcards are existentially quantified over their candidate types (the
        // wildcard's binding narrows which types remain candidates, but does not turn the
        // match into a conjunction over them); a concrete named type has exactly one
        // candidate, so the two conditions coincide there.
        let ok = if is_any || is_wildcard {
            !satisfying_types.is_empty()
        } else {
            !satisfying_types.is_empty() && satisfying_types.len() == candidates.len().max(1)
        };
        Ok((ok, satisfying_types, combined))
    }

    fn eval_activity_query_for_type(
        &self,
        object_type: &str,
        q: &ActivityQuery,
        pe: &ProcessExecutionIndex,
    ) -> Option<(bool, ObjectWitness)> {
        let objects = pe.objects(object_type);
        let card = q
            .object_component
            .cardinality
            .unwrap_or(Cardinality {
                op: Operator::Gte,
                n: 1,
            });
        if !card.holds(objects.len()) {
            return Some((false, ObjectWitness::default()));
        }

        let mut witness = ObjectWitness::default();
        for &ob in objects {
            match self.satisfies_activity_kind(ob, &q.activity_component.kind, pe) {
                Some(evs) => {
                    witness.objects.insert(ob);
                    witness.contributing_events.insert(ob, evs);
                }
                None => return Some((false, ObjectWitness::default())),
            }
        }

        if let Some(mf) = &q.activity_component.metric_filter {
            if let Some(metrics) = self.metrics {
                let before = witness.objects.len();
                witness = apply_object_metric_filter(witness, mf, metrics);
                if witness.objects.len() != before {
                    // an object dropped out of the metric filter; since Psi2 requires ALL
                    // objects of the type to satisfy, a partial drop fails the predicate
                    return Some((false, ObjectWitness::default()));
                }
            }
        }

        Some((true, witness))
    }

    fn object_events_in_pe(&self, ob: ObjectIndex, pe: &ProcessExecutionIndex) -> Vec<EventIndex> {
        let mut evs: Vec<EventIndex> = self
            .locel
            .get_e2o_rev(&ob)
            .map(|(_q, ev)| *ev)
            .filter(|ev| pe.events.contains(ev))
            .collect();
        evs.sort_by_key(|ev| (self.locel.get_ev(ev).time, *ev));
        evs.dedup();
        evs
    }

    /// `δ(o, c_a)`: returns the set of events of `o` that justify the activity condition,
    /// or `None` if it is not satisfied.
    fn satisfies_activity_kind(
        &self,
        ob: ObjectIndex,
        kind: &ActivityKind,
        pe: &ProcessExecutionIndex,
    ) -> Option<BTreeSet<EventIndex>> {
        let events = self.object_events_in_pe(ob, pe);
        if events.is_empty() {
            return None;
        }
        match kind {
            ActivityKind::Single { activities } => {
                let matching: BTreeSet<EventIndex> = events
                    .iter()
                    .copied()
                    .filter(|ev| activities.contains(self.locel.get_ev(ev).event_type.as_str()))
                    .collect();
                if matching.is_empty() {
                    None
                } else {
                    Some(matching)
                }
            }
            ActivityKind::Quantified {
                quantifier: Quantifier::Any,
                activities,
            } => {
                let matching: BTreeSet<EventIndex> = events
                    .iter()
                    .copied()
                    .filter(|ev| activities.contains(self.locel.get_ev(ev).event_type.as_str()))
                    .collect();
                if matching.is_empty() {
                    None
                } else {
                    Some(matching)
                }
            }
            ActivityKind::Quantified {
                quantifier: Quantifier::All,
                activities,
            } => {
                let present: BTreeSet<&str> = events
                    .iter()
                    .map(|ev| self.locel.get_ev(ev).event_type.as_str())
                    .collect();
                let all_present = activities.iter().all(|a| present.contains(a.as_str()));
                if all_present {
                    Some(events.into_iter().collect())
                } else {
                    None
                }
            }
            ActivityKind::Start { activities } => {
                let first = events.first().copied().unwrap();
                if activities.contains(self.locel.get_ev(&first).event_type.as_str()) {
                    Some(BTreeSet::from([first]))
                } else {
                    None
                }
            }
            ActivityKind::End { activities } => {
                let last = events.last().copied().unwrap();
                if activities.contains(self.locel.get_ev(&last).event_type.as_str()) {
                    Some(BTreeSet::from([last]))
                } else {
                    None
                }
            }
            ActivityKind::Cardinality {
                activity,
                cardinality,
            } => {
                let matching: BTreeSet<EventIndex> = events
                    .iter()
                    .copied()
                    .filter(|ev| self.locel.get_ev(ev).event_type.as_str() == activity.as_str())
                    .collect();
                if cardinality.holds(matching.len()) {
                    Some(matching)
                } else {
                    None
                }
            }
        }
    }

    fn eval_object_type_query(
        &mut self,
        q: &ObjectTypeQuery,
        pe: &ProcessExecutionIndex,
    ) -> Result<(bool, Witness), EvalError> {
        let ObjectTypeComponent {
            object_type,
            cardinality,
        } = &q.component;
        let card = cardinality.unwrap_or(Cardinality {
            op: Operator::Gte,
            n: 1,
        });
        let is_any = matches!(object_type, ObjectTypeRef::Any);
        let candidates = self.candidate_types(object_type, pe);

        let mut satisfying = BTreeSet::new();
        for ty in &candidates {
            let count = pe.objects(ty).len();
            if card.holds(count) {
                satisfying.insert(ty.clone());
            }
        }

        let is_wildcard = matches!(object_type, ObjectTypeRef::Wildcard { .. });
        if is_wildcard {
            self.narrow_wildcard(object_type, &satisfying);
            if let ObjectTypeRef::Wildcard { id } = object_type {
                satisfying = self.wildcards.get(id).cloned().unwrap_or_default();
            }
        }

        let ok = if is_any || is_wildcard {
            !satisfying.is_empty()
        } else {
            !satisfying.is_empty() && satisfying.len() == candidates.len().max(1)
        };

        let mut witness = Witness::default();
        for ty in &satisfying {
            let mut ow = ObjectWitness::default();
            ow.objects.extend(pe.objects(ty).iter().copied());
            witness = witness.union(Witness::single_type(ty.clone(), ow));
        }
        Ok((ok, witness))
    }

    fn eval_control_flow_query(
        &mut self,
        q: &ControlFlowQuery,
        pe: &ProcessExecutionIndex,
    ) -> Result<(bool, Witness), EvalError> {
        let (ok1, types1, w1) = self.eval_activity_query(&q.first, pe)?;
        if !ok1 {
            return Ok((false, Witness::default()));
        }
        let (ok2, types2, w2) = self.eval_activity_query(&q.second, pe)?;
        if !ok2 {
            return Ok((false, Witness::default()));
        }

        let o1_objects: Vec<ObjectIndex> = types1
            .iter()
            .flat_map(|t| pe.objects(t).iter().copied())
            .collect();
        let o2_objects: Vec<ObjectIndex> = types2
            .iter()
            .flat_map(|t| pe.objects(t).iter().copied())
            .collect();

        let pair_count = o1_objects.len().saturating_mul(o2_objects.len());
        let mut mapping: BTreeMap<(ObjectIndex, ObjectIndex), BTreeSet<(EventIndex, EventIndex)>> =
            BTreeMap::new();

        if pair_count > self.config.temporal_mapping_safety_cap {
            eprintln!(
                "query: temporal mapping safety cap ({}) exceeded ({} candidate pairs); treating control-flow predicate as unsatisfied",
                self.config.temporal_mapping_safety_cap, pair_count
            );
        } else {
            for &o1 in &o1_objects {
                for &o2 in &o2_objects {
                    if q.relation == TemporalRelation::EventuallyFollows && o1 == o2 {
                        continue;
                    }
                    let e1s = w1
                        .satisfied_objects
                        .iter()
                        .find_map(|(_, ow)| ow.contributing_events.get(&o1))
                        .cloned()
                        .unwrap_or_default();
                    let e2s = w2
                        .satisfied_objects
                        .iter()
                        .find_map(|(_, ow)| ow.contributing_events.get(&o2))
                        .cloned()
                        .unwrap_or_default();
                    for &e1 in &e1s {
                        for &e2 in &e2s {
                            let related = match q.relation {
                                TemporalRelation::DirectlyFollows => pe.graph.has_edge(e1, e2),
                                TemporalRelation::EventuallyFollows => pe.graph.has_path(e1, e2),
                            };
                            if !related {
                                continue;
                            }
                            if let (Some(mf), Some(metrics)) = (&q.metric_filter, self.metrics) {
                                if !metrics.edge_satisfies(e1, e2, &mf.metric, mf.op, mf.value) {
                                    continue;
                                }
                            }
                            mapping.entry((o1, o2)).or_default().insert((e1, e2));
                        }
                    }
                }
            }
        }

        let ConstraintComponent {
            object,
            relationship,
        } = &q.constraint;

        let ok = match (object, relationship) {
            (Some(obj_c), Some(rel_c)) => {
                obj_c.holds(mapping.len())
                    && !mapping.is_empty()
                    && rel_c.holds(mapping.values().map(|v| v.len()).min().unwrap_or(0))
            }
            (Some(obj_c), None) => obj_c.holds(mapping.len()),
            (None, Some(rel_c)) => {
                !mapping.is_empty()
                    && rel_c.holds(mapping.values().map(|v| v.len()).min().unwrap_or(0))
            }
            (None, None) => !mapping.is_empty(),
        };

        if !ok {
            return Ok((false, Witness::default()));
        }

        let mut satisfied_objects: BTreeMap<String, ObjectWitness> = BTreeMap::new();
        let mut edges = BTreeSet::new();
        for ((o1, o2), evs) in &mapping {
            edges.extend(evs.iter().copied());
            let t1 = object_type_of(*o1, pe);
            let t2 = object_type_of(*o2, pe);
            if let Some(t1) = t1 {
                satisfied_objects.entry(t1).or_default().objects.insert(*o1);
            }
            if let Some(t2) = t2 {
                satisfied_objects.entry(t2).or_default().objects.insert(*o2);
            }
        }
        let witness = Witness {
            satisfied_objects,
            satisfied_edges: super::witness::EdgeWitness { edges },
            breakdown: vec![w1, w2],
        };
        Ok((true, witness))
    }
}

fn object_type_of(ob: ObjectIndex, pe: &ProcessExecutionIndex) -> Option<String> {
    for ty in pe.object_types() {
        if pe.objects(ty).contains(&ob) {
            return Some(ty.to_string());
        }
    }
    None
}

fn apply_object_metric_filter(
    mut witness: ObjectWitness,
    mf: &super::ast::MetricFilter,
    metrics: &dyn MetricSource,
) -> ObjectWitness {
    let mut keep = BTreeSet::new();
    for (ob, evs) in witness.contributing_events.iter() {
        if evs
            .iter()
            .any(|ev| metrics.event_satisfies(*ev, &mf.metric, mf.op, mf.value))
        {
            keep.insert(*ob);
        }
    }
    witness.objects = witness.objects.intersection(&keep).copied().collect();
    witness
        .contributing_events
        .retain(|ob, _| witness.objects.contains(ob));
    witness
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocel::ocel_struct::{OCELEvent, OCELObject, OCELRelationship, OCELType, OCEL};
    use crate::object_centric::query::ast::{
        ActivityComponent, ActivityKind, ActivityQuery, ObjectComponent, ObjectTypeRef,
    };
    use crate::object_centric::query::log_index::{ExecutionGraph, LogIndex};
    use chrono::{DateTime, FixedOffset};
    use std::collections::BTreeSet as Set;

    fn t(secs: i64) -> DateTime<FixedOffset> {
        DateTime::from_timestamp(secs, 0).unwrap().fixed_offset()
    }

    fn rel(object_id: &str, qualifier: &str) -> OCELRelationship {
        OCELRelationship {
            object_id: object_id.to_string(),
            qualifier: qualifier.to_string(),
        }
    }

    fn order_log() -> OCEL {
        OCEL {
            event_types: vec![
                OCELType {
                    name: "Create PO".to_string(),
                    attributes: vec![],
                },
                OCELType {
                    name: "Cancel".to_string(),
                    attributes: vec![],
                },
            ],
            object_types: vec![OCELType {
                name: "order".to_string(),
                attributes: vec![],
            }],
            events: vec![
                OCELEvent {
                    id: "e1".to_string(),
                    event_type: "Create PO".to_string(),
                    time: t(0),
                    attributes: vec![],
                    relationships: vec![rel("o1", "order")],
                },
                OCELEvent {
                    id: "e2".to_string(),
                    event_type: "Cancel".to_string(),
                    time: t(5),
                    attributes: vec![],
                    relationships: vec![rel("o2", "order")],
                },
            ],
            objects: vec![
                OCELObject {
                    id: "o1".to_string(),
                    object_type: "order".to_string(),
                    attributes: vec![],
                    relationships: vec![],
                },
                OCELObject {
                    id: "o2".to_string(),
                    object_type: "order".to_string(),
                    attributes: vec![],
                    relationships: vec![],
                },
            ],
        }
    }

    #[test]
    fn start_activity_query_matches_s2() {
        let ocel = order_log();
        let locel = IndexLinkedOCEL::from_ocel(ocel);
        let executions = vec![locel.get_all_evs_ref().copied().collect::<Set<_>>()];
        let idx = LogIndex::build(&locel, executions, &ExecutionGraph::chain_by_time);
        let pe = idx.execution(super::super::log_index::ExecutionIndex(0)).unwrap();

        let query = Query::Activity(ActivityQuery {
            object_component: ObjectComponent {
                object_type: ObjectTypeRef::Named {
                    name: "order".to_string(),
                },
                cardinality: None,
            },
            activity_component: ActivityComponent {
                kind: ActivityKind::Start {
                    activities: vec!["Create PO".to_string()],
                },
                metric_filter: None,
            },
        });

        let config = QueryEngineConfig::default();
        let mut evaluator = Evaluator::new(&locel, &config, None);
        let (ok, _witness) = evaluator.evaluate(&query, pe).unwrap();
        // o2 starts with "Cancel", so the ALL-objects Psi2 check must fail.
        assert!(!ok);
    }

    fn wildcard_and_query() -> Query {
        let leaf = |activity: &str| {
            Query::Activity(ActivityQuery {
                object_component: ObjectComponent {
                    object_type: ObjectTypeRef::Wildcard {
                        id: "WC1".to_string(),
                    },
                    cardinality: None,
                },
                activity_component: ActivityComponent {
                    kind: ActivityKind::Single {
                        activities: vec![activity.to_string()],
                    },
                    metric_filter: None,
                },
            })
        };
        Query::And(Box::new(leaf("A")), Box::new(leaf("B")))
    }

    fn evt(id: &str, activity: &str, secs: i64, object_id: &str, object_type: &str) -> OCELEvent {
        OCELEvent {
            id: id.to_string(),
            event_type: activity.to_string(),
            time: t(secs),
            attributes: vec![],
            relationships: vec![rel(object_id, object_type)],
        }
    }

    fn obj(id: &str, object_type: &str) -> OCELObject {
        OCELObject {
            id: id.to_string(),
            object_type: object_type.to_string(),
            attributes: vec![],
            relationships: vec![],
        }
    }

    fn ty(name: &str) -> OCELType {
        OCELType {
            name: name.to_string(),
            attributes: vec![],
        }
    }

    #[test]
    fn wildcard_binding_fails_when_object_types_do_not_overlap_s6() {
        // `order` objects only ever do "A"; `item` objects only ever do "B" -- no single
        // object type satisfies both halves of the AND, so WC1 never stays bound to
        // anything both predicates agree on.
        let ocel = OCEL {
            event_types: vec![ty("A"), ty("B")],
            object_types: vec![ty("order"), ty("item")],
            events: vec![
                evt("e1", "A", 0, "o1", "order"),
                evt("e2", "B", 5, "i1", "item"),
            ],
            objects: vec![obj("o1", "order"), obj("i1", "item")],
        };
        let locel = IndexLinkedOCEL::from_ocel(ocel);
        let executions = vec![locel.get_all_evs_ref().copied().collect::<Set<_>>()];
        let idx = LogIndex::build(&locel, executions, &ExecutionGraph::chain_by_time);
        let pe = idx.execution(super::super::log_index::ExecutionIndex(0)).unwrap();

        let config = QueryEngineConfig::default();
        let mut evaluator = Evaluator::new(&locel, &config, None);
        let (ok, _witness) = evaluator.evaluate(&wildcard_and_query(), pe).unwrap();
        assert!(!ok);
    }

    #[test]
    fn wildcard_binding_succeeds_when_a_shared_type_does_both_s6() {
        // `order` only does "A"; `case` does both "A" and "B" -- WC1 binds to
        // {order, case} on the first predicate, narrows to {case} on the second, and the
        // narrowed (non-empty) binding is what makes the AND succeed.
        let ocel = OCEL {
            event_types: vec![ty("A"), ty("B")],
            object_types: vec![ty("order"), ty("case")],
            events: vec![
                evt("e1", "A", 0, "o1", "order"),
                evt("e2", "A", 1, "c1", "case"),
                evt("e3", "B", 5, "c1", "case"),
            ],
            objects: vec![obj("o1", "order"), obj("c1", "case")],
        };
        let locel = IndexLinkedOCEL::from_ocel(ocel);
        let executions = vec![locel.get_all_evs_ref().copied().collect::<Set<_>>()];
        let idx = LogIndex::build(&locel, executions, &ExecutionGraph::chain_by_time);
        let pe = idx.execution(super::super::log_index::ExecutionIndex(0)).unwrap();

        let config = QueryEngineConfig::default();
        let mut evaluator = Evaluator::new(&locel, &config, None);
        let (ok, _witness) = evaluator.evaluate(&wildcard_and_query(), pe).unwrap();
        assert!(ok);
    }
}
