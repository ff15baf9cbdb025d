use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::ocel::linked_ocel::IndexLinkedOCEL;

use super::ast::Query;
use super::error::DriverError;
use super::evaluator::Evaluator;
use super::log_index::{ExecutionIndex, LogIndex};
use super::metrics::MetricSource;
use super::witness::Witness;

/// Runtime configuration for the query engine
#[derive(Debug, Clone, Copy)]
pub struct QueryEngineConfig {
    /// Upper bound on `|O1| x |O2|` candidate object pairs considered when constructing a
    /// control-flow query's temporal mapping; exceeding it aborts that predicate to `false`
    /// (with a diagnostic) rather than building an unbounded mapping.
    pub temporal_mapping_safety_cap: usize,
    /// Wall-clock budget for live mode, measured from the start of iteration
    pub live_timeout: Duration,
}

impl Default for QueryEngineConfig {
    fn default() -> Self {
        Self {
            temporal_mapping_safety_cap: 10_000,
            live_timeout: Duration::from_secs(30),
        }
    }
}

/// Metadata describing one run of the query engine, alongside its matches
#[derive(Debug, Clone)]
pub struct QueryRunMeta {
    /// Human-readable name of the run (caller-supplied, defaults to empty)
    pub name: String,
    /// Wall-clock duration of the run
    pub raw_time: Duration,
    /// Instant the run started
    pub start: Instant,
    /// Instant the run finished (or was aborted by timeout)
    pub end: Instant,
}

/// The result of running a query across a [`LogIndex`]: which executions matched, their
/// witnesses, and run metadata.
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Number of process executions that matched
    pub length: usize,
    /// Indices of matching executions, in the order they were evaluated
    pub indices: Vec<ExecutionIndex>,
    /// Witness per matching execution, parallel to `indices`
    pub detailed_results: Vec<Witness>,
    /// The query that was run
    pub query_structure: Query,
    /// Run metadata
    pub run: QueryRunMeta,
}

/// Full mode evaluates every process execution and returns all matches.
///
/// Sequential by default; see [`execute_par`] for a rayon-parallel variant over independent
/// executions (each execution gets its own [`Evaluator`], since wildcard bindings are
/// per-execution state).
pub fn execute(
    query: &Query,
    locel: &IndexLinkedOCEL,
    log_index: &LogIndex,
    config: &QueryEngineConfig,
    metrics: Option<&dyn MetricSource>,
) -> Result<QueryResult, DriverError> {
    let start = Instant::now();
    let mut indices = Vec::new();
    let mut detailed_results = Vec::new();

    for idx in log_index.execution_indices() {
        let pe = log_index
            .execution(idx)
            .expect("execution_indices() only yields in-range indices");
        let mut evaluator = Evaluator::new(locel, config, metrics);
        let (ok, witness) = evaluator.evaluate(query, pe)?;
        if ok {
            indices.push(idx);
            detailed_results.push(witness.unwrap_or_default());
        }
    }

    let end = Instant::now();
    Ok(QueryResult {
        length: indices.len(),
        indices,
        detailed_results,
        query_structure: query.clone(),
        run: QueryRunMeta {
            name: String::new(),
            raw_time: end.duration_since(start),
            start,
            end,
        },
    })
}

/// Full mode, evaluating independent executions in parallel via rayon.
///
/// Each execution is still evaluated by its own fresh [`Evaluator`] (wildcard bindings never
/// cross execution boundaries), so the work is embarrassingly parallel.
pub fn execute_par(
    query: &Query,
    locel: &IndexLinkedOCEL,
    log_index: &LogIndex,
    config: &QueryEngineConfig,
    metrics: Option<&(dyn MetricSource + Sync)>,
) -> Result<QueryResult, DriverError>
where
    IndexLinkedOCEL: Sync,
{
    let start = Instant::now();
    let exec_indices: Vec<ExecutionIndex> = log_index.execution_indices().collect();

    let results: Result<Vec<Option<(ExecutionIndex, Witness)>>, DriverError> = exec_indices
        .into_par_iter()
        .map(|idx| {
            let pe = log_index
                .execution(idx)
                .expect("execution_indices() only yields in-range indices");
            let mut evaluator = Evaluator::new(locel, config, metrics.map(|m| m as &dyn MetricSource));
            let (ok, witness) = evaluator.evaluate(query, pe)?;
            Ok(ok.then(|| (idx, witness.unwrap_or_default())))
        })
        .collect();

    let mut indices = Vec::new();
    let mut detailed_results = Vec::new();
    for (idx, witness) in results?.into_iter().flatten() {
        indices.push(idx);
        detailed_results.push(witness);
    }

    let end = Instant::now();
    Ok(QueryResult {
        length: indices.len(),
        indices,
        detailed_results,
        query_structure: query.clone(),
        run: QueryRunMeta {
            name: String::new(),
            raw_time: end.duration_since(start),
            start,
            end,
        },
    })
}

/// Live mode: returns the first matching execution, or [`DriverError::Timeout`] if none is
/// found before `config.live_timeout` elapses (measured from the start of iteration).
pub fn execute_live(
    query: &Query,
    locel: &IndexLinkedOCEL,
    log_index: &LogIndex,
    config: &QueryEngineConfig,
    metrics: Option<&dyn MetricSource>,
) -> Result<QueryResult, DriverError> {
    let start = Instant::now();

    for idx in log_index.execution_indices() {
        if start.elapsed() > config.live_timeout {
            return Err(DriverError::Timeout);
        }
        let pe = log_index
            .execution(idx)
            .expect("execution_indices() only yields in-range indices");
        let mut evaluator = Evaluator::new(locel, config, metrics);
        let (ok, witness) = evaluator.evaluate(query, pe)?;
        if ok {
            let end = Instant::now();
            return Ok(QueryResult {
                length: 1,
                indices: vec![idx],
                detailed_results: vec![witness.unwrap_or_default()],
                query_structure: query.clone(),
                run: QueryRunMeta {
                    name: String::new(),
                    raw_time: end.duration_since(start),
                    start,
                    end,
                },
            });
        }
    }

    Err(DriverError::Timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_centric::query::ast::{
        ActivityComponent, ActivityKind, ActivityQuery, ObjectComponent, ObjectTypeRef,
    };
    use crate::object_centric::query::log_index::ExecutionGraph;
    use crate::ocel::ocel_struct::{OCELEvent, OCELObject, OCELRelationship, OCELType, OCEL};
    use chrono::{DateTime, FixedOffset};
    use std::collections::BTreeSet;

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
            event_types: vec![OCELType {
                name: "Pick".to_string(),
                attributes: vec![],
            }],
            object_types: vec![OCELType {
                name: "item".to_string(),
                attributes: vec![],
            }],
            events: vec![OCELEvent {
                id: "e1".to_string(),
                event_type: "Pick".to_string(),
                time: t(0),
                attributes: vec![],
                relationships: vec![rel("i1", "item")],
            }],
            objects: vec![OCELObject {
                id: "i1".to_string(),
                object_type: "item".to_string(),
                attributes: vec![],
                relationships: vec![],
            }],
        }
    }

    #[test]
    fn full_mode_finds_match() {
        let ocel = sample_ocel();
        let locel = IndexLinkedOCEL::from_ocel(ocel);
        let events: BTreeSet<_> = locel.get_all_evs_ref().copied().collect();
        let log_index = LogIndex::build(&locel, vec![events], &ExecutionGraph::chain_by_time);

        let query = Query::Activity(ActivityQuery {
            object_component: ObjectComponent {
                object_type: ObjectTypeRef::Named {
                    name: "item".to_string(),
                },
                cardinality: None,
            },
            activity_component: ActivityComponent {
                kind: ActivityKind::Single {
                    activities: vec!["Pick".to_string()],
                },
                metric_filter: None,
            },
        });

        let config = QueryEngineConfig::default();
        let result = execute(&query, &locel, &log_index, &config, None).unwrap();
        assert_eq!(result.length, 1);
    }

    fn ty(name: &str) -> OCELType {
        OCELType {
            name: name.to_string(),
            attributes: vec![],
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

    fn evt(id: &str, activity: &str, secs: i64, rels: Vec<OCELRelationship>) -> OCELEvent {
        OCELEvent {
            id: id.to_string(),
            event_type: activity.to_string(),
            time: t(secs),
            attributes: vec![],
            relationships: rels,
        }
    }

    /// 4 independent executions with `order` counts `[2,1,0,3]`; `(ot=order, >=, 2)` -> `[0, 3]`.
    #[test]
    fn object_type_query_cardinality_matches_s1() {
        let mut events = Vec::new();
        let mut objects = Vec::new();
        let counts: [usize; 4] = [2, 1, 0, 3];
        for (exec, &n) in counts.iter().enumerate() {
            for i in 0..n {
                let oid = format!("o{exec}_{i}");
                objects.push(obj(&oid, "order"));
                events.push(evt(
                    &format!("e{exec}_{i}"),
                    "Touch",
                    (exec * 10 + i) as i64,
                    vec![rel(&oid, "order")],
                ));
            }
        }
        let ocel = OCEL {
            event_types: vec![ty("Touch")],
            object_types: vec![ty("order")],
            events,
            objects,
        };
        let locel = IndexLinkedOCEL::from_ocel(ocel);

        let mut executions = Vec::new();
        for (exec, &n) in counts.iter().enumerate() {
            let evs: BTreeSet<_> = (0..n)
                .map(|i| {
                    *locel
                        .get_all_evs_ref()
                        .find(|e| locel.get_ev(e).id == format!("e{exec}_{i}"))
                        .unwrap()
                })
                .collect();
            executions.push(evs);
        }
        let log_index = LogIndex::build(&locel, executions, &ExecutionGraph::chain_by_time);

        let query = Query::ObjectType(crate::object_centric::query::ast::ObjectTypeQuery {
            component: crate::object_centric::query::ast::ObjectTypeComponent {
                object_type: ObjectTypeRef::Named {
                    name: "order".to_string(),
                },
                cardinality: Some(crate::object_centric::query::ast::Cardinality {
                    op: crate::object_centric::query::ast::Operator::Gte,
                    n: 2,
                }),
            },
        });
        let config = QueryEngineConfig::default();
        let result = execute(&query, &locel, &log_index, &config, None).unwrap();
        assert_eq!(
            result.indices,
            vec![ExecutionIndex(0), ExecutionIndex(3)]
        );
    }

    /// `NOT((order,>=,2))` over the S1 log complements `[0,3]` to `[1,2]`.
    #[test]
    fn not_composition_complements_s1_to_s5() {
        let mut events = Vec::new();
        let mut objects = Vec::new();
        let counts: [usize; 4] = [2, 1, 0, 3];
        for (exec, &n) in counts.iter().enumerate() {
            for i in 0..n {
                let oid = format!("o{exec}_{i}");
                objects.push(obj(&oid, "order"));
                events.push(evt(
                    &format!("e{exec}_{i}"),
                    "Touch",
                    (exec * 10 + i) as i64,
                    vec![rel(&oid, "order")],
                ));
            }
        }
        let ocel = OCEL {
            event_types: vec![ty("Touch")],
            object_types: vec![ty("order")],
            events,
            objects,
        };
        let locel = IndexLinkedOCEL::from_ocel(ocel);

        let mut executions = Vec::new();
        for (exec, &n) in counts.iter().enumerate() {
            let evs: BTreeSet<_> = (0..n)
                .map(|i| {
                    *locel
                        .get_all_evs_ref()
                        .find(|e| locel.get_ev(e).id == format!("e{exec}_{i}"))
                        .unwrap()
                })
                .collect();
            executions.push(evs);
        }
        let log_index = LogIndex::build(&locel, executions, &ExecutionGraph::chain_by_time);

        let inner = Query::ObjectType(crate::object_centric::query::ast::ObjectTypeQuery {
            component: crate::object_centric::query::ast::ObjectTypeComponent {
                object_type: ObjectTypeRef::Named {
                    name: "order".to_string(),
                },
                cardinality: Some(crate::object_centric::query::ast::Cardinality {
                    op: crate::object_centric::query::ast::Operator::Gte,
                    n: 2,
                }),
            },
        });
        let query = Query::Not(Box::new(inner));
        let config = QueryEngineConfig::default();
        let result = execute(&query, &locel, &log_index, &config, None).unwrap();
        assert_eq!(
            result.indices,
            vec![ExecutionIndex(1), ExecutionIndex(2)]
        );
    }

    /// Object `i1` has 3 `Pick -> Pack` edges; `ControlFlow(Pick/item, Pack/item, DF,
    /// (rel,=,3))` is satisfied.
    #[test]
    fn directly_follows_with_relationship_cardinality_matches_s3() {
        let mut events = Vec::new();
        for i in 0i64..3 {
            events.push(evt(
                &format!("pick{i}"),
                "Pick",
                i * 2,
                vec![rel("i1", "item")],
            ));
            events.push(evt(
                &format!("pack{i}"),
                "Pack",
                i * 2 + 1,
                vec![rel("i1", "item")],
            ));
        }
        let ocel = OCEL {
            event_types: vec![ty("Pick"), ty("Pack")],
            object_types: vec![ty("item")],
            events,
            objects: vec![obj("i1", "item")],
        };
        let locel = IndexLinkedOCEL::from_ocel(ocel);
        let all_events: BTreeSet<_> = locel.get_all_evs_ref().copied().collect();
        let log_index = LogIndex::build(&locel, vec![all_events], &ExecutionGraph::chain_by_time);

        let leaf = |activity: &str| ActivityQuery {
            object_component: ObjectComponent {
                object_type: ObjectTypeRef::Named {
                    name: "item".to_string(),
                },
                cardinality: None,
            },
            activity_component: ActivityComponent {
                kind: ActivityKind::Single {
                    activities: vec![activity.to_string()],
                },
                metric_filter: None,
            },
        };
        let query = Query::ControlFlow(Box::new(
            crate::object_centric::query::ast::ControlFlowQuery {
                first: leaf("Pick"),
                second: leaf("Pack"),
                relation: crate::object_centric::query::ast::TemporalRelation::DirectlyFollows,
                constraint: crate::object_centric::query::ast::ConstraintComponent {
                    object: None,
                    relationship: Some(crate::object_centric::query::ast::Cardinality {
                        op: crate::object_centric::query::ast::Operator::Eq,
                        n: 3,
                    }),
                },
                metric_filter: None,
            },
        ));
        let config = QueryEngineConfig::default();
        let result = execute(&query, &locel, &log_index, &config, None).unwrap();
        assert_eq!(result.length, 1);
    }

    /// Path `A -> X -> B` on object `o1`: a DF query over `(A,B)` fails since `X` sits
    /// between them, but an EF query over the same pair succeeds.
    #[test]
    fn eventually_follows_succeeds_where_directly_follows_fails_s4() {
        let ocel = OCEL {
            event_types: vec![ty("A"), ty("X"), ty("B")],
            object_types: vec![ty("order")],
            events: vec![
                evt("e1", "A", 0, vec![rel("o1", "order")]),
                evt("e2", "X", 1, vec![rel("o1", "order")]),
                evt("e3", "B", 2, vec![rel("o1", "order")]),
            ],
            objects: vec![obj("o1", "order")],
        };
        let locel = IndexLinkedOCEL::from_ocel(ocel);
        let all_events: BTreeSet<_> = locel.get_all_evs_ref().copied().collect();
        let log_index = LogIndex::build(&locel, vec![all_events], &ExecutionGraph::chain_by_time);

        let leaf = |activity: &str| ActivityQuery {
            object_component: ObjectComponent {
                object_type: ObjectTypeRef::Named {
                    name: "order".to_string(),
                },
                cardinality: None,
            },
            activity_component: ActivityComponent {
                kind: ActivityKind::Single {
                    activities: vec![activity.to_string()],
                },
                metric_filter: None,
            },
        };
        let config = QueryEngineConfig::default();

        let df_query = Query::ControlFlow(Box::new(
            crate::object_centric::query::ast::ControlFlowQuery {
                first: leaf("A"),
                second: leaf("B"),
                relation: crate::object_centric::query::ast::TemporalRelation::DirectlyFollows,
                constraint: crate::object_centric::query::ast::ConstraintComponent::default(),
                metric_filter: None,
            },
        ));
        let df_result = execute(&df_query, &locel, &log_index, &config, None).unwrap();
        assert_eq!(df_result.length, 0);

        let ef_query = Query::ControlFlow(Box::new(
            crate::object_centric::query::ast::ControlFlowQuery {
                first: leaf("A"),
                second: leaf("B"),
                relation: crate::object_centric::query::ast::TemporalRelation::EventuallyFollows,
                constraint: crate::object_centric::query::ast::ConstraintComponent::default(),
                metric_filter: None,
            },
        ));
        let ef_result = execute(&ef_query, &locel, &log_index, &config, None).unwrap();
        assert_eq!(ef_result.length, 1);
    }
}
