//! Translate external query representations into the closed [`super::ast::Query`] AST.
//!
//! Two input shapes are accepted, mirroring the two formats a caller can hand in (see the
//! Design Notes on the Converter): a legacy flat JSON record (`isStart`, `isDirectlyFollowed`,
//! ...) and a graphical node/edge diagram built from `activityQuery`/`objectTypeQuery`/
//! `controlFlowQuery`/`logicalOperator` nodes. Both funnel through the same atomic-component
//! parsing helpers at the bottom of the file.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use super::ast::{
    ActivityComponent, ActivityKind, ActivityQuery, Cardinality, ConstraintComponent,
    ControlFlowQuery, MetricFilter, ObjectComponent, ObjectTypeComponent, ObjectTypeQuery,
    ObjectTypeRef, Operator, Query, Quantifier, TemporalRelation,
};
use super::error::ConversionError;

/// Controls whether unresolved activity/object-type names abort conversion.
///
/// Permissive (the default) lets a name that does not exist in the log through: the resulting
/// predicate simply never matches anything at evaluation time, since no object or event carries
/// it. Strict mode requires `known_activities`/`known_object_types` and raises
/// [`ConversionError::UnknownName`] on a miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConverterMode<'a> {
    /// When `true`, names are checked against the supplied known sets
    pub strict: bool,
    /// Known activity labels, consulted only when `strict`
    pub known_activities: Option<&'a BTreeSet<String>>,
    /// Known object type names, consulted only when `strict`
    pub known_object_types: Option<&'a BTreeSet<String>>,
}

impl<'a> ConverterMode<'a> {
    /// The default permissive mode: no validation against the log at all
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Strict mode, validating against the given known names
    pub fn strict(known_activities: &'a BTreeSet<String>, known_object_types: &'a BTreeSet<String>) -> Self {
        Self {
            strict: true,
            known_activities: Some(known_activities),
            known_object_types: Some(known_object_types),
        }
    }

    fn check_activity(&self, name: &str) -> Result<(), ConversionError> {
        if self.strict {
            if let Some(known) = self.known_activities {
                if !known.contains(name) {
                    return Err(ConversionError::UnknownName(name.to_string()));
                }
            }
        }
        Ok(())
    }

    fn check_object_type(&self, ot: &ObjectTypeRef) -> Result<(), ConversionError> {
        if let ObjectTypeRef::Named { name } = ot {
            if self.strict {
                if let Some(known) = self.known_object_types {
                    if !known.contains(name.as_str()) {
                        return Err(ConversionError::UnknownName(name.clone()));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Parse an object-type reference from a legacy/diagram string: `"ANY"` for the pseudo-type,
/// `"WC..."` for a wildcard, anything else as a named type.
fn parse_object_type_ref(raw: &str) -> ObjectTypeRef {
    if raw == "ANY" || raw.is_empty() {
        ObjectTypeRef::Any
    } else if let Some(id) = raw.strip_prefix("WC") {
        ObjectTypeRef::Wildcard {
            id: format!("WC{id}"),
        }
    } else {
        ObjectTypeRef::Named {
            name: raw.to_string(),
        }
    }
}

fn parse_operator(raw: &str) -> Result<Operator, ConversionError> {
    match raw {
        "gte" | ">=" => Ok(Operator::Gte),
        "lte" | "<=" => Ok(Operator::Lte),
        "eq" | "=" | "==" => Ok(Operator::Eq),
        other => Err(ConversionError::UnknownQueryTag(other.to_string())),
    }
}

fn parse_quantifier(raw: &str) -> Result<Quantifier, ConversionError> {
    match raw {
        "ANY" => Ok(Quantifier::Any),
        "ALL" => Ok(Quantifier::All),
        other => Err(ConversionError::UnknownQueryTag(other.to_string())),
    }
}

fn str_field<'v>(v: &'v Value, field: &str) -> Option<&'v str> {
    v.get(field).and_then(Value::as_str)
}

fn u64_field(v: &Value, field: &str) -> Option<u64> {
    v.get(field).and_then(Value::as_u64)
}

fn f64_field(v: &Value, field: &str) -> Option<f64> {
    v.get(field).and_then(Value::as_f64)
}

/// Read an `n_operator`/`n`-shaped (or `p_operator`/`p`-shaped) cardinality pair, if both
/// fields are present. `p` is rounded down to a natural number per §4.C.
fn read_cardinality(v: &Value, op_field: &str, n_field: &str) -> Result<Option<Cardinality>, ConversionError> {
    match (str_field(v, op_field), v.get(n_field)) {
        (Some(op_raw), Some(n_raw)) => {
            let op = parse_operator(op_raw)?;
            let n = n_raw
                .as_f64()
                .ok_or_else(|| ConversionError::MissingField(n_field.to_string()))?;
            Ok(Some(Cardinality {
                op,
                n: n.floor() as usize,
            }))
        }
        _ => Ok(None),
    }
}

/// Read an optional `metric_filter: {metric, op, value}` field, attached to a diagram node's
/// activity or control-flow component (see Component G).
fn parse_metric_filter(v: &Value) -> Result<Option<MetricFilter>, ConversionError> {
    match v.get("metric_filter") {
        None | Some(Value::Null) => Ok(None),
        Some(mf) => {
            let metric = str_field(mf, "metric")
                .ok_or_else(|| ConversionError::MissingField("metric".to_string()))?
                .to_string();
            let op = str_field(mf, "op")
                .map(parse_operator)
                .transpose()?
                .unwrap_or(Operator::Gte);
            let value = f64_field(mf, "value")
                .ok_or_else(|| ConversionError::MissingField("value".to_string()))?;
            Ok(Some(MetricFilter { metric, op, value }))
        }
    }
}

/// Read a string-or-list-of-strings field into a `Vec<String>`
fn read_activities(v: &Value, field: &str) -> Vec<String> {
    match v.get(field) {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------------------
// Legacy flat-record conversion
// ---------------------------------------------------------------------------------------

/// Convert a legacy flat query record (keyed by a `query` tag) into a [`Query`].
///
/// Tag dispatch follows §4.C point 1: `isStart`/`isEnd` produce an [`ActivityQuery`] with kind
/// `start`/`end`; `isContainedEvent` produces `single` unless `n_operator`+`n` are present, in
/// which case it produces `cardinality`; `areContainedEvents` produces `quantified`;
/// `containsObjectsOfType` produces an [`ObjectTypeQuery`]; `isDirectlyFollowed`/
/// `isEventuallyFollowed` produce a [`ControlFlowQuery`].
pub fn convert_legacy_query(record: &Value, mode: ConverterMode) -> Result<Query, ConversionError> {
    let tag = str_field(record, "query")
        .ok_or_else(|| ConversionError::MissingField("query".to_string()))?;

    match tag {
        "isStart" | "isEnd" | "isContainedEvent" | "areContainedEvents" => {
            convert_legacy_activity(record, tag, mode).map(Query::Activity)
        }
        "containsObjectsOfType" => convert_legacy_object_type(record, mode).map(Query::ObjectType),
        "isDirectlyFollowed" | "isEventuallyFollowed" => {
            convert_legacy_control_flow(record, tag, mode)
                .map(|cfq| Query::ControlFlow(Box::new(cfq)))
        }
        other => Err(ConversionError::UnknownQueryTag(other.to_string())),
    }
}

fn convert_legacy_activity(
    record: &Value,
    tag: &str,
    mode: ConverterMode,
) -> Result<ActivityQuery, ConversionError> {
    let object_type = parse_object_type_ref(str_field(record, "object_type").unwrap_or("ANY"));
    mode.check_object_type(&object_type)?;
    let object_cardinality = read_cardinality(record, "n_operator", "n")?;
    let activities = read_activities(record, "event_activity");
    for a in &activities {
        mode.check_activity(a)?;
    }

    let kind = match tag {
        "isStart" => ActivityKind::Start { activities },
        "isEnd" => ActivityKind::End { activities },
        "isContainedEvent" => match &object_cardinality {
            Some(card) => {
                let activity = activities
                    .first()
                    .cloned()
                    .ok_or_else(|| ConversionError::MissingField("event_activity".to_string()))?;
                ActivityKind::Cardinality {
                    activity,
                    cardinality: *card,
                }
            }
            None => ActivityKind::Single { activities },
        },
        "areContainedEvents" => {
            let quantifier = match str_field(record, "quantifier") {
                Some(raw) => parse_quantifier(raw)?,
                None => Quantifier::Any,
            };
            ActivityKind::Quantified {
                quantifier,
                activities,
            }
        }
        _ => unreachable!("dispatched only for activity-shaped tags"),
    };

    Ok(ActivityQuery {
        object_component: ObjectComponent {
            object_type,
            cardinality: object_cardinality,
        },
        activity_component: ActivityComponent {
            kind,
            metric_filter: None,
        },
    })
}

fn convert_legacy_object_type(
    record: &Value,
    mode: ConverterMode,
) -> Result<ObjectTypeQuery, ConversionError> {
    let object_type = parse_object_type_ref(str_field(record, "object_type").unwrap_or("ANY"));
    mode.check_object_type(&object_type)?;
    let cardinality = read_cardinality(record, "n_operator", "n")?;
    Ok(ObjectTypeQuery {
        component: ObjectTypeComponent {
            object_type,
            cardinality,
        },
    })
}

fn convert_legacy_control_flow(
    record: &Value,
    tag: &str,
    mode: ConverterMode,
) -> Result<ControlFlowQuery, ConversionError> {
    let first = single_activity_query(
        record,
        "first_type",
        "first_activity",
        mode,
    )?;
    let second = single_activity_query(
        record,
        "second_type",
        "second_activity",
        mode,
    )?;
    let relation = match tag {
        "isDirectlyFollowed" => TemporalRelation::DirectlyFollows,
        "isEventuallyFollowed" => TemporalRelation::EventuallyFollows,
        _ => unreachable!("dispatched only for control-flow tags"),
    };
    let relationship = read_cardinality(record, "n_operator", "n")?;
    let object = read_cardinality(record, "p_operator", "p")?;
    Ok(ControlFlowQuery {
        first,
        second,
        relation,
        constraint: ConstraintComponent {
            object,
            relationship,
        },
        metric_filter: None,
    })
}

fn single_activity_query(
    record: &Value,
    type_field: &str,
    activity_field: &str,
    mode: ConverterMode,
) -> Result<ActivityQuery, ConversionError> {
    let object_type = parse_object_type_ref(str_field(record, type_field).unwrap_or("ANY"));
    mode.check_object_type(&object_type)?;
    let activities = read_activities(record, activity_field);
    for a in &activities {
        mode.check_activity(a)?;
    }
    Ok(ActivityQuery {
        object_component: ObjectComponent {
            object_type,
            cardinality: None,
        },
        activity_component: ActivityComponent {
            kind: ActivityKind::Single { activities },
            metric_filter: None,
        },
    })
}

// ---------------------------------------------------------------------------------------
// Graphical diagram conversion
// ---------------------------------------------------------------------------------------

/// One of the four typed nodes a graphical query diagram can contain
#[derive(Debug, Clone)]
pub enum DiagramNodeKind {
    /// An activity-query node; `data` follows the `ActivityQuery` JSON schema of §6
    ActivityQuery(Value),
    /// An object-type-query node; `data` follows the `ObjectTypeQuery` JSON schema of §6
    ObjectTypeQuery(Value),
    /// A control-flow-query node; `data` follows the `ControlFlowQuery` JSON schema of §6
    ControlFlowQuery(Value),
    /// An internal composition node (`AND`/`OR`/`NOT`)
    LogicalOperator(LogicalOperatorKind),
}

/// The kind of a `logicalOperator` diagram node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperatorKind {
    /// Binary conjunction
    And,
    /// Binary disjunction
    Or,
    /// Unary negation
    Not,
}

/// A node of a graphical query diagram
#[derive(Debug, Clone)]
pub struct DiagramNode {
    /// Diagram-local identifier
    pub id: String,
    /// The node's kind and data
    pub kind: DiagramNodeKind,
}

/// A directed edge of a graphical query diagram, `source -> target`
#[derive(Debug, Clone)]
pub struct DiagramEdge {
    /// Source node id
    pub source: String,
    /// Target node id
    pub target: String,
}

/// A graphical query diagram: typed nodes plus directed edges between them
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    /// The diagram's nodes
    pub nodes: Vec<DiagramNode>,
    /// The diagram's edges
    pub edges: Vec<DiagramEdge>,
}

/// Convert a graphical node/edge diagram into a [`Query`], or `None` if the diagram elides to
/// nothing (an isolated `AND`/`OR` with zero resolved operands; see §4.C point "Arity").
pub fn convert_diagram(diagram: &Diagram, mode: ConverterMode) -> Result<Option<Query>, ConversionError> {
    let node_by_id: HashMap<&str, &DiagramNode> =
        diagram.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let operator_ids: BTreeSet<&str> = diagram
        .nodes
        .iter()
        .filter(|n| matches!(n.kind, DiagramNodeKind::LogicalOperator(_)))
        .map(|n| n.id.as_str())
        .collect();

    if operator_ids.is_empty() {
        return convert_query_node_list(&diagram.nodes, mode).map(|q| q);
    }

    // Direction detection: count edges incident to logical operators in each direction and use
    // the dominant one uniformly (§4.C point 2).
    let edges_into_operators = diagram
        .edges
        .iter()
        .filter(|e| operator_ids.contains(e.target.as_str()))
        .count();
    let edges_out_of_operators = diagram
        .edges
        .iter()
        .filter(|e| operator_ids.contains(e.source.as_str()))
        .count();

    // operand -> operator map, regardless of which literal direction the diagram drew the edge
    let mut operator_operands: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut operand_has_operator_parent: BTreeSet<&str> = BTreeSet::new();
    if edges_into_operators >= edges_out_of_operators {
        for e in &diagram.edges {
            if operator_ids.contains(e.target.as_str()) {
                operator_operands
                    .entry(e.target.as_str())
                    .or_default()
                    .push(e.source.as_str());
                operand_has_operator_parent.insert(e.source.as_str());
            }
        }
    } else {
        for e in &diagram.edges {
            if operator_ids.contains(e.source.as_str()) {
                operator_operands
                    .entry(e.source.as_str())
                    .or_default()
                    .push(e.target.as_str());
                operand_has_operator_parent.insert(e.target.as_str());
            }
        }
    }

    // connected (incident) operators
    let connected_operators: BTreeSet<&str> = diagram
        .edges
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .filter(|id| operator_ids.contains(id))
        .collect();
    let isolated_operators: Vec<&str> = operator_ids
        .iter()
        .copied()
        .filter(|id| !connected_operators.contains(id))
        .collect();

    if connected_operators.is_empty() {
        // Isolated logical operators combine otherwise-unconnected query nodes.
        let query_nodes: Vec<&DiagramNode> = diagram
            .nodes
            .iter()
            .filter(|n| !matches!(n.kind, DiagramNodeKind::LogicalOperator(_)))
            .collect();
        if let Some(&op_id) = isolated_operators.first() {
            let op_node = node_by_id[op_id];
            let DiagramNodeKind::LogicalOperator(kind) = &op_node.kind else {
                unreachable!()
            };
            let operands: Vec<Query> = query_nodes
                .iter()
                .map(|n| convert_single_node(n, mode))
                .collect::<Result<_, _>>()?;
            if *kind == LogicalOperatorKind::Not && operands.len() != 1 {
                return Err(ConversionError::InvalidNotArity(operands.len()));
            }
            return Ok(compose(*kind, operands));
        }
        return convert_query_node_list(&diagram.nodes, mode);
    }

    // Root: the connected operator that is not itself an operand of another operator.
    let mut roots: Vec<&str> = connected_operators
        .iter()
        .copied()
        .filter(|id| !operand_has_operator_parent.contains(id))
        .collect();
    roots.sort();
    let root_id = match roots.first() {
        Some(id) => *id,
        None => return Err(ConversionError::AmbiguousRoot),
    };

    let mut memo: HashMap<&str, Option<Query>> = HashMap::new();
    let built = build_composition_tree(root_id, &node_by_id, &operator_operands, mode, &mut memo)?;
    Ok(built)
}

fn convert_query_node_list(
    nodes: &[DiagramNode],
    mode: ConverterMode,
) -> Result<Option<Query>, ConversionError> {
    let query_nodes: Vec<&DiagramNode> = nodes
        .iter()
        .filter(|n| !matches!(n.kind, DiagramNodeKind::LogicalOperator(_)))
        .collect();
    if query_nodes.is_empty() {
        return Ok(None);
    }
    let queries: Vec<Query> = query_nodes
        .iter()
        .map(|n| convert_single_node(n, mode))
        .collect::<Result<_, _>>()?;
    Ok(Query::and_all(queries))
}

fn build_composition_tree<'n>(
    node_id: &'n str,
    node_by_id: &HashMap<&'n str, &'n DiagramNode>,
    operator_operands: &HashMap<&'n str, Vec<&'n str>>,
    mode: ConverterMode,
    memo: &mut HashMap<&'n str, Option<Query>>,
) -> Result<Option<Query>, ConversionError> {
    if let Some(cached) = memo.get(node_id) {
        return Ok(cached.clone());
    }
    let node = *node_by_id
        .get(node_id)
        .ok_or_else(|| ConversionError::DanglingReference(node_id.to_string()))?;

    let result = match &node.kind {
        DiagramNodeKind::LogicalOperator(kind) => {
            let operand_ids = operator_operands.get(node_id).cloned().unwrap_or_default();
            if *kind == LogicalOperatorKind::Not && operand_ids.len() != 1 {
                return Err(ConversionError::InvalidNotArity(operand_ids.len()));
            }
            let mut operands = Vec::new();
            for operand_id in operand_ids {
                if let Some(q) = build_composition_tree(
                    operand_id,
                    node_by_id,
                    operator_operands,
                    mode,
                    memo,
                )? {
                    operands.push(q);
                }
            }
            compose(*kind, operands)
        }
        _ => Some(convert_single_node(node, mode)?),
    };
    memo.insert(node_id, result.clone());
    Ok(result)
}

/// Fold `operands` with `kind`, honoring arity rules (§4.C "Arity"): `AND`/`OR` left-fold when
/// given more than two operands, and an empty operand list elides the node. Callers check `NOT`
/// arity themselves before reaching here (raising [`ConversionError::InvalidNotArity`] when a
/// `NOT` node's structural operand count isn't exactly one), so by the time `compose` runs on a
/// `Not`, `operands` always has exactly one element.
fn compose(kind: LogicalOperatorKind, mut operands: Vec<Query>) -> Option<Query> {
    match kind {
        LogicalOperatorKind::Not => operands.pop().map(|q| Query::Not(Box::new(q))),
        LogicalOperatorKind::And => Query::and_all(operands),
        LogicalOperatorKind::Or => Query::or_all(operands),
    }
}

fn convert_single_node(node: &DiagramNode, mode: ConverterMode) -> Result<Query, ConversionError> {
    match &node.kind {
        DiagramNodeKind::ActivityQuery(data) => parse_activity_query(data, mode).map(Query::Activity),
        DiagramNodeKind::ObjectTypeQuery(data) => {
            parse_object_type_query(data, mode).map(Query::ObjectType)
        }
        DiagramNodeKind::ControlFlowQuery(data) => {
            parse_control_flow_query(data, mode).map(|cfq| Query::ControlFlow(Box::new(cfq)))
        }
        DiagramNodeKind::LogicalOperator(_) => Err(ConversionError::MissingField(
            "logical operator node converted as a leaf".to_string(),
        )),
    }
}

/// Parse the `components.object_component` shape of §6: `{object_type, op?, count?}`
fn parse_object_component(v: &Value, mode: ConverterMode) -> Result<ObjectComponent, ConversionError> {
    let object_type = parse_object_type_ref(str_field(v, "object_type").unwrap_or("ANY"));
    mode.check_object_type(&object_type)?;
    let cardinality = match (str_field(v, "op"), u64_field(v, "count")) {
        (Some(op), Some(n)) => Some(Cardinality {
            op: parse_operator(op)?,
            n: n as usize,
        }),
        _ => None,
    };
    Ok(ObjectComponent {
        object_type,
        cardinality,
    })
}

/// Parse the `components.activity_component` shape of §6:
/// `{activities[], activity_type, quantifier?, op?, count?}`
fn parse_activity_component(v: &Value, mode: ConverterMode) -> Result<ActivityComponent, ConversionError> {
    let activities = read_activities(v, "activities");
    for a in &activities {
        mode.check_activity(a)?;
    }
    let activity_type = str_field(v, "activity_type")
        .ok_or_else(|| ConversionError::MissingField("activity_type".to_string()))?;
    let kind = match activity_type {
        "single" => ActivityKind::Single { activities },
        "start" => ActivityKind::Start { activities },
        "end" => ActivityKind::End { activities },
        "quantified" => {
            let quantifier = match str_field(v, "quantifier") {
                Some(raw) => parse_quantifier(raw)?,
                None => Quantifier::Any,
            };
            ActivityKind::Quantified {
                quantifier,
                activities,
            }
        }
        "cardinality" => {
            let activity = activities
                .first()
                .cloned()
                .ok_or_else(|| ConversionError::MissingField("activities".to_string()))?;
            let op = str_field(v, "op").map(parse_operator).transpose()?.unwrap_or(Operator::Gte);
            let n = u64_field(v, "count").unwrap_or(1) as usize;
            ActivityKind::Cardinality {
                activity,
                cardinality: Cardinality { op, n },
            }
        }
        other => return Err(ConversionError::UnknownQueryTag(other.to_string())),
    };
    Ok(ActivityComponent {
        kind,
        metric_filter: parse_metric_filter(v)?,
    })
}

fn parse_activity_query(v: &Value, mode: ConverterMode) -> Result<ActivityQuery, ConversionError> {
    let components = v
        .get("components")
        .ok_or_else(|| ConversionError::MissingField("components".to_string()))?;
    let object_component = parse_object_component(
        components
            .get("object_component")
            .ok_or_else(|| ConversionError::MissingField("object_component".to_string()))?,
        mode,
    )?;
    let activity_component = parse_activity_component(
        components
            .get("activity_component")
            .ok_or_else(|| ConversionError::MissingField("activity_component".to_string()))?,
        mode,
    )?;
    Ok(ActivityQuery {
        object_component,
        activity_component,
    })
}

fn parse_object_type_query(v: &Value, mode: ConverterMode) -> Result<ObjectTypeQuery, ConversionError> {
    let components = v
        .get("components")
        .ok_or_else(|| ConversionError::MissingField("components".to_string()))?;
    let otc = components
        .get("object_type_component")
        .ok_or_else(|| ConversionError::MissingField("object_type_component".to_string()))?;
    let object_type = parse_object_type_ref(str_field(otc, "object_type").unwrap_or("ANY"));
    mode.check_object_type(&object_type)?;
    let cardinality = match (str_field(otc, "op"), u64_field(otc, "count")) {
        (Some(op), Some(n)) => Some(Cardinality {
            op: parse_operator(op)?,
            n: n as usize,
        }),
        _ => None,
    };
    Ok(ObjectTypeQuery {
        component: ObjectTypeComponent {
            object_type,
            cardinality,
        },
    })
}

fn parse_control_flow_query(v: &Value, mode: ConverterMode) -> Result<ControlFlowQuery, ConversionError> {
    let components = v
        .get("components")
        .ok_or_else(|| ConversionError::MissingField("components".to_string()))?;
    let first = parse_activity_query(
        components
            .get("first")
            .ok_or_else(|| ConversionError::MissingField("first".to_string()))?,
        mode,
    )?;
    let second = parse_activity_query(
        components
            .get("second")
            .ok_or_else(|| ConversionError::MissingField("second".to_string()))?,
        mode,
    )?;
    let relation = match str_field(components, "relation") {
        Some("DF") | None => TemporalRelation::DirectlyFollows,
        Some("EF") => TemporalRelation::EventuallyFollows,
        Some(other) => return Err(ConversionError::UnknownQueryTag(other.to_string())),
    };
    let constraint_data = components.get("constraint");
    let constraint = match constraint_data {
        Some(c) => ConstraintComponent {
            object: parse_cardinality_obj(c.get("object"))?,
            relationship: parse_cardinality_obj(c.get("relationship"))?,
        },
        None => ConstraintComponent::default(),
    };
    let metric_filter = parse_metric_filter(components)?;
    Ok(ControlFlowQuery {
        first,
        second,
        relation,
        constraint,
        metric_filter,
    })
}

fn parse_cardinality_obj(v: Option<&Value>) -> Result<Option<Cardinality>, ConversionError> {
    match v {
        None | Some(Value::Null) => Ok(None),
        Some(obj) => {
            let op = str_field(obj, "op")
                .ok_or_else(|| ConversionError::MissingField("op".to_string()))?;
            let n = u64_field(obj, "n")
                .ok_or_else(|| ConversionError::MissingField("n".to_string()))?;
            Ok(Some(Cardinality {
                op: parse_operator(op)?,
                n: n as usize,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_is_start() {
        let record = json!({
            "query": "isStart",
            "object_type": "order",
            "event_activity": "Create PO",
        });
        let q = convert_legacy_query(&record, ConverterMode::permissive()).unwrap();
        match q {
            Query::Activity(aq) => {
                assert!(matches!(
                    aq.object_component.object_type,
                    ObjectTypeRef::Named { ref name } if name == "order"
                ));
                assert!(matches!(aq.activity_component.kind, ActivityKind::Start { .. }));
            }
            _ => panic!("expected ActivityQuery"),
        }
    }

    #[test]
    fn legacy_contained_event_cardinality() {
        let record = json!({
            "query": "isContainedEvent",
            "object_type": "item",
            "event_activity": "Pick",
            "n_operator": "eq",
            "n": 3,
        });
        let q = convert_legacy_query(&record, ConverterMode::permissive()).unwrap();
        match q {
            Query::Activity(aq) => match aq.activity_component.kind {
                ActivityKind::Cardinality { ref activity, cardinality } => {
                    assert_eq!(activity, "Pick");
                    assert_eq!(cardinality, Cardinality { op: Operator::Eq, n: 3 });
                }
                _ => panic!("expected Cardinality kind"),
            },
            _ => panic!("expected ActivityQuery"),
        }
    }

    #[test]
    fn legacy_directly_followed_with_both_constraints() {
        let record = json!({
            "query": "isDirectlyFollowed",
            "first_type": "item",
            "first_activity": "Pick",
            "second_type": "item",
            "second_activity": "Pack",
            "n_operator": "eq",
            "n": 3,
            "p_operator": "gte",
            "p": 1.9,
        });
        let q = convert_legacy_query(&record, ConverterMode::permissive()).unwrap();
        match q {
            Query::ControlFlow(cfq) => {
                assert_eq!(cfq.relation, TemporalRelation::DirectlyFollows);
                assert_eq!(cfq.constraint.relationship, Some(Cardinality { op: Operator::Eq, n: 3 }));
                // p=1.9 floors to 1
                assert_eq!(cfq.constraint.object, Some(Cardinality { op: Operator::Gte, n: 1 }));
            }
            _ => panic!("expected ControlFlowQuery"),
        }
    }

    #[test]
    fn unknown_tag_errors() {
        let record = json!({"query": "bogus"});
        let err = convert_legacy_query(&record, ConverterMode::permissive()).unwrap_err();
        assert!(matches!(err, ConversionError::UnknownQueryTag(_)));
    }

    #[test]
    fn strict_mode_rejects_unknown_activity() {
        let known_activities: BTreeSet<String> = ["Create PO".to_string()].into_iter().collect();
        let known_types: BTreeSet<String> = ["order".to_string()].into_iter().collect();
        let record = json!({
            "query": "isStart",
            "object_type": "order",
            "event_activity": "Nonexistent",
        });
        let mode = ConverterMode::strict(&known_activities, &known_types);
        let err = convert_legacy_query(&record, mode).unwrap_err();
        assert!(matches!(err, ConversionError::UnknownName(_)));
    }

    fn activity_node(id: &str, object_type: &str, activity: &str) -> DiagramNode {
        DiagramNode {
            id: id.to_string(),
            kind: DiagramNodeKind::ActivityQuery(json!({
                "components": {
                    "object_component": {"object_type": object_type},
                    "activity_component": {"activities": [activity], "activity_type": "single"},
                }
            })),
        }
    }

    #[test]
    fn diagram_without_operators_ands_in_order() {
        let diagram = Diagram {
            nodes: vec![
                activity_node("n1", "order", "Create PO"),
                activity_node("n2", "order", "Ship"),
            ],
            edges: vec![],
        };
        let q = convert_diagram(&diagram, ConverterMode::permissive()).unwrap().unwrap();
        assert!(matches!(q, Query::And(_, _)));
    }

    #[test]
    fn diagram_with_or_operator_combines_with_or() {
        let diagram = Diagram {
            nodes: vec![
                activity_node("n1", "order", "Create PO"),
                activity_node("n2", "order", "Cancel"),
                DiagramNode {
                    id: "op".to_string(),
                    kind: DiagramNodeKind::LogicalOperator(LogicalOperatorKind::Or),
                },
            ],
            edges: vec![
                DiagramEdge {
                    source: "n1".to_string(),
                    target: "op".to_string(),
                },
                DiagramEdge {
                    source: "n2".to_string(),
                    target: "op".to_string(),
                },
            ],
        };
        let q = convert_diagram(&diagram, ConverterMode::permissive()).unwrap().unwrap();
        assert!(matches!(q, Query::Or(_, _)));
    }

    #[test]
    fn diagram_not_operator_unary() {
        let diagram = Diagram {
            nodes: vec![
                activity_node("n1", "order", "Cancel"),
                DiagramNode {
                    id: "op".to_string(),
                    kind: DiagramNodeKind::LogicalOperator(LogicalOperatorKind::Not),
                },
            ],
            edges: vec![DiagramEdge {
                source: "n1".to_string(),
                target: "op".to_string(),
            }],
        };
        let q = convert_diagram(&diagram, ConverterMode::permissive()).unwrap().unwrap();
        assert!(matches!(q, Query::Not(_)));
    }

    #[test]
    fn activity_query_parses_metric_filter() {
        let node = DiagramNode {
            id: "n1".to_string(),
            kind: DiagramNodeKind::ActivityQuery(json!({
                "components": {
                    "object_component": {"object_type": "item"},
                    "activity_component": {
                        "activities": ["Pick"],
                        "activity_type": "single",
                        "metric_filter": {"metric": "cost", "op": "lte", "value": 9.5},
                    },
                }
            })),
        };
        let q = convert_single_node(&node, ConverterMode::permissive()).unwrap();
        match q {
            Query::Activity(aq) => {
                let mf = aq.activity_component.metric_filter.expect("metric filter present");
                assert_eq!(mf.metric, "cost");
                assert_eq!(mf.op, Operator::Lte);
                assert_eq!(mf.value, 9.5);
            }
            _ => panic!("expected ActivityQuery"),
        }
    }

    #[test]
    fn not_with_two_operands_errors() {
        let diagram = Diagram {
            nodes: vec![
                activity_node("n1", "order", "Create PO"),
                activity_node("n2", "order", "Cancel"),
                DiagramNode {
                    id: "op".to_string(),
                    kind: DiagramNodeKind::LogicalOperator(LogicalOperatorKind::Not),
                },
            ],
            edges: vec![
                DiagramEdge {
                    source: "n1".to_string(),
                    target: "op".to_string(),
                },
                DiagramEdge {
                    source: "n2".to_string(),
                    target: "op".to_string(),
                },
            ],
        };
        let err = convert_diagram(&diagram, ConverterMode::permissive()).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidNotArity(2)));
    }

    #[test]
    fn isolated_not_with_two_query_nodes_errors() {
        let diagram = Diagram {
            nodes: vec![
                activity_node("n1", "order", "Create PO"),
                activity_node("n2", "order", "Cancel"),
                DiagramNode {
                    id: "op".to_string(),
                    kind: DiagramNodeKind::LogicalOperator(LogicalOperatorKind::Not),
                },
            ],
            edges: vec![],
        };
        let err = convert_diagram(&diagram, ConverterMode::permissive()).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidNotArity(2)));
    }

    #[test]
    fn empty_and_elides_to_none() {
        let diagram = Diagram {
            nodes: vec![DiagramNode {
                id: "op".to_string(),
                kind: DiagramNodeKind::LogicalOperator(LogicalOperatorKind::And),
            }],
            edges: vec![],
        };
        let q = convert_diagram(&diagram, ConverterMode::permissive()).unwrap();
        assert!(q.is_none());
    }
}
