use std::collections::HashMap;

use crate::ocel::linked_ocel::index_linked_ocel::EventIndex;

use super::ast::Operator;

/// External per-event metric source consumed (not computed) by the Evaluator.
///
/// The engine does not compute metrics itself (see the "Non-goals" around metric computation);
/// a caller wires in whatever numeric values it already has (lead time, cost, a custom KPI) and
/// the Evaluator only ever reads through this trait.
pub trait MetricSource {
    /// Look up a named metric for one event, if present
    fn metric(&self, ev: EventIndex, name: &str) -> Option<f64>;

    /// Whether `ev`'s `name` metric satisfies `op value`
    fn event_satisfies(&self, ev: EventIndex, name: &str, op: Operator, value: f64) -> bool {
        match self.metric(ev, name) {
            Some(m) => compare(m, op, value),
            None => false,
        }
    }

    /// Whether the edge `start -> end` satisfies `op value` for `name`.
    ///
    /// `"lead_time"` is resolved as `lead_time(end) - lead_time(start)`; any other metric name
    /// is looked up directly on the end event.
    fn edge_satisfies(
        &self,
        start: EventIndex,
        end: EventIndex,
        name: &str,
        op: Operator,
        value: f64,
    ) -> bool {
        if name == "lead_time" {
            match (self.metric(start, "lead_time"), self.metric(end, "lead_time")) {
                (Some(s), Some(e)) => compare(e - s, op, value),
                _ => false,
            }
        } else {
            self.event_satisfies(end, name, op, value)
        }
    }
}

fn compare(lhs: f64, op: Operator, rhs: f64) -> bool {
    match op {
        Operator::Gte => lhs >= rhs,
        Operator::Lte => lhs <= rhs,
        Operator::Eq => (lhs - rhs).abs() < f64::EPSILON,
    }
}

/// A plain in-memory [`MetricSource`], the shape an external caller is expected to supply:
/// a per-event table of named numeric metrics.
#[derive(Debug, Clone, Default)]
pub struct MetricTable {
    values: HashMap<EventIndex, HashMap<String, f64>>,
}

impl MetricTable {
    /// An empty metric table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a metric value for one event
    pub fn insert(&mut self, ev: EventIndex, name: impl Into<String>, value: f64) {
        self.values.entry(ev).or_default().insert(name.into(), value);
    }
}

impl MetricSource for MetricTable {
    fn metric(&self, ev: EventIndex, name: &str) -> Option<f64> {
        self.values.get(&ev).and_then(|m| m.get(name)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocel::linked_ocel::index_linked_ocel::EventIndex;

    #[test]
    fn lead_time_edge_metric_is_difference() {
        let mut table = MetricTable::new();
        let a = EventIndex::from(0usize);
        let b = EventIndex::from(1usize);
        table.insert(a, "lead_time", 10.0);
        table.insert(b, "lead_time", 25.0);
        assert!(table.edge_satisfies(a, b, "lead_time", Operator::Gte, 10.0));
        assert!(!table.edge_satisfies(a, b, "lead_time", Operator::Gte, 20.0));
    }

    #[test]
    fn missing_metric_never_satisfies() {
        let table = MetricTable::new();
        let a = EventIndex::from(0usize);
        assert!(!table.event_satisfies(a, "cost", Operator::Gte, 0.0));
    }
}
