//! Subset-log export: given a set of matched process executions, produce an [`OCEL`] containing
//! only the events and objects those executions touch.
//!
//! Follows the same source-struct-cloning approach as [`crate::event_log::ocel::flatten`]:
//! iterate the underlying log through [`LinkedOCELAccess`] and clone the [`OCELEvent`]/
//! [`OCELObject`] values verbatim rather than rebuilding them field by field, so attributes and
//! timestamps round-trip exactly as the source log stored them. `OCELEvent::time` already
//! serializes as ISO-8601 via its `chrono` `Serialize` impl, so no reformatting is needed here.

use std::collections::BTreeSet;

use crate::ocel::linked_ocel::index_linked_ocel::EventIndex;
use crate::ocel::linked_ocel::{IndexLinkedOCEL, LinkedOCELAccess};
use crate::ocel::ocel_struct::OCEL;

use super::log_index::{ExecutionIndex, LogIndex};

/// Build the subset [`OCEL`] induced by a set of matched process executions: the union of their
/// events, plus every object those events reference (directly, through E2O relationships).
///
/// Event and object type definitions are carried over unchanged, since a subset log should still
/// describe the full schema of the log it was drawn from, not just the fragment that happens to
/// appear in the matched executions.
pub fn export_subset(
    locel: &IndexLinkedOCEL,
    log_index: &LogIndex,
    matches: &[ExecutionIndex],
) -> OCEL {
    let mut event_ids: BTreeSet<EventIndex> = BTreeSet::new();
    for &idx in matches {
        if let Some(pe) = log_index.execution(idx) {
            event_ids.extend(pe.events.iter().copied());
        }
    }
    export_events(locel, &event_ids)
}

/// Build the subset [`OCEL`] induced directly by an explicit event set, e.g. a single
/// [`super::log_index::ProcessExecutionIndex::events`] or a hand-picked union of several.
pub fn export_events(locel: &IndexLinkedOCEL, event_ids: &BTreeSet<EventIndex>) -> OCEL {
    let mut object_ids = BTreeSet::new();
    for ev in event_ids {
        for (_qualifier, ob) in locel.get_e2o(ev) {
            object_ids.insert(*ob);
        }
    }

    let mut events: Vec<_> = event_ids.iter().map(|ev| locel.get_ev(ev).clone()).collect();
    events.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.id.cmp(&b.id)));

    let mut objects: Vec<_> = object_ids.iter().map(|ob| locel.get_ob(ob).clone()).collect();
    objects.sort_by(|a, b| a.id.cmp(&b.id));

    OCEL {
        event_types: locel
            .get_ev_types()
            .filter_map(|name| locel.get_ev_type(name).cloned())
            .collect(),
        object_types: locel
            .get_ob_types()
            .filter_map(|name| locel.get_ob_type(name).cloned())
            .collect(),
        events,
        objects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_centric::query::log_index::ExecutionGraph;
    use crate::ocel::ocel_struct::{OCELEvent, OCELObject, OCELRelationship, OCELType};
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
                    relationships: vec![rel("i2", "item")],
                },
            ],
            objects: vec![
                OCELObject {
                    id: "i1".to_string(),
                    object_type: "item".to_string(),
                    attributes: vec![],
                    relationships: vec![],
                },
                OCELObject {
                    id: "i2".to_string(),
                    object_type: "item".to_string(),
                    attributes: vec![],
                    relationships: vec![],
                },
            ],
        }
    }

    #[test]
    fn export_subset_only_includes_matched_executions_objects() {
        let ocel = sample_ocel();
        let locel = IndexLinkedOCEL::from_ocel(ocel);
        let e1 = *locel.get_evs_of_type("Pick").next().unwrap();
        let single_exec: BTreeSet<EventIndex> = [e1].into_iter().collect();
        let log_index = LogIndex::build(
            &locel,
            vec![single_exec],
            &ExecutionGraph::chain_by_time,
        );

        let out = export_subset(&locel, &log_index, &[ExecutionIndex(0)]);
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.events[0].id, "e1");
        assert_eq!(out.objects.len(), 1);
        assert_eq!(out.objects[0].id, "i1");
        // schema is carried over in full even though only one event type appears
        assert_eq!(out.event_types.len(), 2);
        assert_eq!(out.object_types.len(), 1);
    }
}
