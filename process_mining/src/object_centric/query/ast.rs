use serde::{Deserialize, Serialize};

/// Comparison operator used by cardinality predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// Greater than or equal
    #[serde(rename = "gte")]
    Gte,
    /// Less than or equal
    #[serde(rename = "lte")]
    Lte,
    /// Equal
    #[serde(rename = "eq")]
    Eq,
}

impl Operator {
    /// Evaluate `lhs <op> rhs`
    pub fn apply(&self, lhs: usize, rhs: usize) -> bool {
        match self {
            Operator::Gte => lhs >= rhs,
            Operator::Lte => lhs <= rhs,
            Operator::Eq => lhs == rhs,
        }
    }
}

/// A cardinality condition: a comparison operator and a natural-number operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cardinality {
    /// Comparison operator
    pub op: Operator,
    /// Right-hand-side operand
    pub n: usize,
}

impl Cardinality {
    /// Whether `count` satisfies this cardinality condition
    pub fn holds(&self, count: usize) -> bool {
        self.op.apply(count, self.n)
    }
}

/// An object-type reference: a concrete name, the `ANY` pseudo-type, or a wildcard
/// placeholder narrowed by intersection during evaluation (see `WC*` in the design notes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ObjectTypeRef {
    /// A concrete, named object type
    Named {
        /// The object type's name
        name: String,
    },
    /// The pseudo-type referring to the union of all object types of an execution
    Any,
    /// A wildcard placeholder, narrowed by intersection as the query executes
    Wildcard {
        /// Identifier of the wildcard (e.g. `"WC1"`)
        id: String,
    },
}

/// `(ot, op?, n?)` — an object type plus an optional cardinality condition over its count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectComponent {
    /// The referenced object type
    pub object_type: ObjectTypeRef,
    /// Optional cardinality condition over the count of matching objects; defaults to `>= 1`
    pub cardinality: Option<Cardinality>,
}

/// Whether a quantified activity condition requires any or all matching events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quantifier {
    /// At least one event of the object must match
    Any,
    /// Every event of the object must have a matching activity represented
    All,
}

/// The kind of per-object activity condition `δ(o, c_a)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ActivityKind {
    /// Some event of the object has one of the listed activities
    Single {
        /// Candidate activities
        activities: Vec<String>,
    },
    /// The object's earliest event (by `(time, id)`) has one of the listed activities
    Start {
        /// Candidate activities
        activities: Vec<String>,
    },
    /// The object's latest event (by `(time, id)`) has one of the listed activities
    End {
        /// Candidate activities
        activities: Vec<String>,
    },
    /// Quantified membership of a single activity's events over the object's activity set
    Quantified {
        /// ANY or ALL
        quantifier: Quantifier,
        /// Candidate activities
        activities: Vec<String>,
    },
    /// Exact event-count cardinality for one activity
    Cardinality {
        /// The activity being counted
        activity: String,
        /// Cardinality condition over the count of matching events
        cardinality: Cardinality,
    },
}

/// An optional metric filter attached to an atomic predicate (see Component G)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFilter {
    /// Name of the metric looked up in the externally supplied metric table
    pub metric: String,
    /// Comparison operator
    pub op: Operator,
    /// Right-hand-side operand (metrics are not necessarily natural numbers)
    pub value: f64,
}

/// `(A, kind)` — the activity component of an [`ActivityQuery`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityComponent {
    /// The per-object activity condition
    pub kind: ActivityKind,
    /// Optional metric filter, applied after the activity condition
    pub metric_filter: Option<MetricFilter>,
}

/// `Q_a = (ObjectComponent, ActivityComponent)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityQuery {
    /// The object-type / cardinality condition
    pub object_component: ObjectComponent,
    /// The per-object activity condition
    pub activity_component: ActivityComponent,
}

/// `(ot, op?, n?)` — cardinality over `|objects of type ot in P|`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTypeComponent {
    /// The referenced object type
    pub object_type: ObjectTypeRef,
    /// Optional cardinality condition; defaults to `>= 1`
    pub cardinality: Option<Cardinality>,
}

/// `Q_ot = (ObjectTypeComponent)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTypeQuery {
    /// The object-type cardinality condition
    pub component: ObjectTypeComponent,
}

/// Directly-follows vs. eventually-follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporalRelation {
    /// Direct successor edge in the execution graph
    DirectlyFollows,
    /// Any directed path in the execution graph
    EventuallyFollows,
}

/// Up to two cardinality conditions over a temporal mapping: object cardinality and
/// relationship cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConstraintComponent {
    /// Cardinality over `|dom(M)|`
    pub object: Option<Cardinality>,
    /// Cardinality over `min |M(o1,o2)|`
    pub relationship: Option<Cardinality>,
}

/// `Q_cf = (Q_a^1, Q_a^2, T, ConstraintComponent)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlFlowQuery {
    /// First activity query (the "from" side)
    pub first: ActivityQuery,
    /// Second activity query (the "to" side)
    pub second: ActivityQuery,
    /// DF or EF
    pub relation: TemporalRelation,
    /// Constraint over the temporal mapping
    pub constraint: ConstraintComponent,
    /// Optional metric filter over edges (`end.lead_time - start.lead_time`)
    pub metric_filter: Option<MetricFilter>,
}

/// The closed query AST: atomic predicates plus logical composition.
///
/// Kept as one sum type rather than a separate `ComposedQuery` wrapper so that dispatch
/// stays exhaustive (see the Design Notes on sum types).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Query {
    /// An [`ActivityQuery`]
    Activity(ActivityQuery),
    /// An [`ObjectTypeQuery`]
    ObjectType(ObjectTypeQuery),
    /// A [`ControlFlowQuery`]
    ControlFlow(Box<ControlFlowQuery>),
    /// Logical conjunction
    And(Box<Query>, Box<Query>),
    /// Logical disjunction
    Or(Box<Query>, Box<Query>),
    /// Logical negation
    Not(Box<Query>),
}

impl Query {
    /// Fold a non-empty list of queries left-associatively with AND
    pub fn and_all(mut queries: Vec<Query>) -> Option<Query> {
        if queries.is_empty() {
            return None;
        }
        let mut acc = queries.remove(0);
        for q in queries {
            acc = Query::And(Box::new(acc), Box::new(q));
        }
        Some(acc)
    }

    /// Fold a non-empty list of queries left-associatively with OR
    pub fn or_all(mut queries: Vec<Query>) -> Option<Query> {
        if queries.is_empty() {
            return None;
        }
        let mut acc = queries.remove(0);
        for q in queries {
            acc = Query::Or(Box::new(acc), Box::new(q));
        }
        Some(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let q = Query::And(
            Box::new(Query::ObjectType(ObjectTypeQuery {
                component: ObjectTypeComponent {
                    object_type: ObjectTypeRef::Named {
                        name: "order".to_string(),
                    },
                    cardinality: Some(Cardinality {
                        op: Operator::Gte,
                        n: 2,
                    }),
                },
            })),
            Box::new(Query::Not(Box::new(Query::Activity(ActivityQuery {
                object_component: ObjectComponent {
                    object_type: ObjectTypeRef::Any,
                    cardinality: None,
                },
                activity_component: ActivityComponent {
                    kind: ActivityKind::Single {
                        activities: vec!["Cancel".to_string()],
                    },
                    metric_filter: None,
                },
            })))),
        );
        let json = serde_json::to_string(&q).unwrap();
        let back: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(q, back);
    }

    #[test]
    fn and_all_left_associates() {
        let leaf = || {
            Query::ObjectType(ObjectTypeQuery {
                component: ObjectTypeComponent {
                    object_type: ObjectTypeRef::Named {
                        name: "order".to_string(),
                    },
                    cardinality: None,
                },
            })
        };
        let combined = Query::and_all(vec![leaf(), leaf(), leaf()]).unwrap();
        match combined {
            Query::And(l, r) => {
                assert!(matches!(*r, Query::ObjectType(_)));
                assert!(matches!(*l, Query::And(_, _)));
            }
            _ => panic!("expected AND"),
        }
    }
}
