//! Splitting Event Logs in Multiple Sublogs
use rand::distr::{Distribution, Uniform};
use rand::prelude::ThreadRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use super::constants::ACTIVITY_NAME;
use super::event_log_struct::{AttributeValue, EventLog, Trace};

///
/// Picks a randomized number of subsets to distribute a set of activities to and computes then a
/// distribution of the activities among the subsets such that no subset is empty.
///
/// # Arguments
///
/// * `activity_set`: A set of all activities that should be distributed among n sets.
/// * `max_num_of_splits`: The maximum number of sets to split the set of activities into.
///
/// Returns a `Vec`<`HashSet`<`&str`>> which is a distribution of activities among the randomized
/// size n of subsets in \[2,`max_num_of_splits`\].
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use process_mining::event_log::event_log_splitter::random_activity_split_max_bins;
///
/// let mut activities = HashSet::new();
/// activities.insert("Admission IC");
/// activities.insert("ER Sepsis Triage");
/// activities.insert("IV Antibiotics");
/// activities.insert("Release A");
/// activities.insert("Release B");
/// activities.insert("Admission NC");
///
/// let split_sets: Vec<HashSet<&str>> = random_activity_split_max_bins(&activities, 4);
/// ```
pub fn random_activity_split_max_bins<'a>(
    activity_set: &'a HashSet<&str>,
    max_num_of_splits: usize,
) -> Vec<HashSet<&'a str>> {
    if max_num_of_splits < 2 {
        return vec![activity_set.clone()];
    } else if max_num_of_splits > activity_set.len() {
        let mut result = Vec::new();
        activity_set.iter().for_each(|&activity| {
            result.push(HashSet::from([activity]));
        });
        return result;
    }

    let mut rng: ThreadRng = rand::rng();
    let num_split_event_logs: usize = rng.random_range(2..max_num_of_splits);
    random_activity_split(activity_set, num_split_event_logs)
}

///
/// Distributes a set of activities over a given number of subsets such that no subset is empty.
///
/// # Arguments
///
/// * `activity_set`: A set of all activities that should be distributed among n sets.
/// * `num_of_splits`: Number of subsets to distribute the activities to.
///
/// Returns: Vec<`HashSet`<&str>> which is a distribution of strings over several subsets.
pub fn random_activity_split<'a>(
    activity_set: &'a HashSet<&str>,
    num_of_splits: usize,
) -> Vec<HashSet<&'a str>> {
    let mut rng: ThreadRng = rand::rng();

    let mut activity_split_sets: Vec<HashSet<&str>> = Vec::with_capacity(num_of_splits);
    for _ in 0..num_of_splits {
        activity_split_sets.push(HashSet::new());
    }

    let uniform_dist: Uniform<usize> = Uniform::new(0, num_of_splits).unwrap();

    let mut vec: Vec<&str> = activity_set.iter().copied().collect::<Vec<&str>>();
    vec.shuffle(&mut rng);

    for (pos, activity) in vec.iter().enumerate() {
        if pos < activity_split_sets.len() {
            activity_split_sets[pos].insert(activity);
        } else {
            activity_split_sets[uniform_dist.sample(&mut rng)].insert(activity);
        }
    }

    activity_split_sets
}

fn clone_log_without_traces(log: &EventLog) -> EventLog {
    EventLog {
        attributes: log.attributes.clone(),
        traces: Vec::new(),
        extensions: log.extensions.clone(),
        classifiers: log.classifiers.clone(),
        global_trace_attrs: log.global_trace_attrs.clone(),
        global_event_attrs: log.global_event_attrs.clone(),
    }
}

fn clone_trace_without_events(trace: &Trace) -> Trace {
    Trace {
        attributes: trace.attributes.clone(),
        events: Vec::new(),
    }
}

fn activity_label(trace: &Trace, pos: usize) -> String {
    match trace.events[pos].attributes.get_by_key(ACTIVITY_NAME) {
        Some(at) => match &at.value {
            AttributeValue::String(s) => s.clone(),
            _ => String::new(),
        },
        None => String::new(),
    }
}

/// An `ActivityBasedEventLogSplitter` is used to split an event log into several event logs using
/// a given distribution of activities.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityBasedEventLogSplitter<'a> {
    /// The activity sets to split by
    pub activity_split_sets: &'a Vec<HashSet<&'a str>>,
    /// The number of event logs that we split to
    pub num_split_event_logs: usize,
    /// The input event log to be split
    pub event_log: &'a EventLog,
}

impl<'a> ActivityBasedEventLogSplitter<'a> {
    ///
    /// Creates a new `ActivityBasedEventLogSplitter` that can be used to split an event log into
    /// several sub event logs by the given activities. The number of sets to be obtained is
    /// derived from the number of sets in the `activity_split_sets`.
    ///
    pub fn new(event_log: &'a EventLog, activity_split_sets: &'a Vec<HashSet<&str>>) -> Self {
        Self {
            activity_split_sets,
            num_split_event_logs: activity_split_sets.len(),
            event_log,
        }
    }

    ///
    /// Whether the given activity sets are disjoint.
    ///
    pub fn check_split_set_validity(&self) -> bool {
        let mut all_activity_set: HashSet<&str> = HashSet::new();
        let mut expected_size: usize = 0;

        for set in self.activity_split_sets {
            all_activity_set.extend(set);
            expected_size += set.len();

            if all_activity_set.len() != expected_size {
                return false;
            }
        }

        true
    }

    ///
    /// Index of the split set an activity belongs to, or `num_split_event_logs` if it belongs
    /// to none of them.
    ///
    pub fn find_activity_set(&self, activity: &str) -> usize {
        for (pos, set) in self.activity_split_sets.iter().enumerate() {
            if set.contains(activity) {
                return pos;
            }
        }

        self.num_split_event_logs
    }

    ///
    /// Splits the event log into several event logs based on the activity split sets. Empty
    /// traces are kept in every resulting log.
    ///
    pub fn split(&self) -> Vec<EventLog> {
        let mut result: Vec<EventLog> = Vec::with_capacity(self.num_split_event_logs);
        for _ in 0..self.num_split_event_logs {
            result.push(clone_log_without_traces(self.event_log));
        }

        for trace in &self.event_log.traces {
            for event_log in result.iter_mut().take(self.num_split_event_logs) {
                event_log.traces.push(clone_trace_without_events(trace));
            }

            for (pos, event) in trace.events.iter().enumerate() {
                let activity_label = activity_label(trace, pos);
                let split_pos = self.find_activity_set(&activity_label);
                if split_pos < self.num_split_event_logs {
                    result[split_pos]
                        .traces
                        .last_mut()
                        .unwrap()
                        .events
                        .push(event.clone());
                }
            }
        }

        result
    }
}

/// A `RandomEventLogSplitter` is used to split an event log into several event logs by randomly
/// assigning events to the sub event logs.
#[derive(Debug, Clone)]
pub struct RandomEventLogSplitter<'a> {
    num_split_event_logs: usize,
    event_log: &'a EventLog,
    rng: ThreadRng,
}

impl<'a> RandomEventLogSplitter<'a> {
    ///
    /// Creates a new `RandomEventLogSplitter` splitting `event_log` into `num_split_event_logs`
    /// sub event logs, assigning events to sub logs uniformly at random.
    ///
    pub fn new(event_log: &'a EventLog, num_split_event_logs: usize) -> Self {
        Self {
            event_log,
            num_split_event_logs,
            rng: rand::rng(),
        }
    }

    ///
    /// Splits the event log into several event logs randomly. Empty traces are kept track of,
    /// and they are added to each event log.
    ///
    pub fn split(&mut self) -> Vec<EventLog> {
        let uniform_distribution: Uniform<usize> =
            Uniform::new(0, self.num_split_event_logs).unwrap();

        let mut result: Vec<EventLog> = Vec::with_capacity(self.num_split_event_logs);
        for _ in 0..self.num_split_event_logs {
            result.push(clone_log_without_traces(self.event_log));
        }

        for trace in &self.event_log.traces {
            for res in &mut result {
                res.traces.push(clone_trace_without_events(trace));
            }

            for event in &trace.events {
                let split_pos = uniform_distribution.sample(&mut self.rng);
                result[split_pos]
                    .traces
                    .last_mut()
                    .unwrap()
                    .events
                    .push(event.clone());
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::event_log_struct::Event;

    fn log_with_activities(activities: &[&str]) -> EventLog {
        EventLog {
            attributes: Vec::new(),
            traces: vec![Trace {
                attributes: Vec::new(),
                events: activities.iter().map(|a| Event::new(a.to_string())).collect(),
            }],
            extensions: None,
            classifiers: None,
            global_trace_attrs: None,
            global_event_attrs: None,
        }
    }

    #[test]
    fn random_activity_split_covers_every_activity_exactly_once() {
        let activities: HashSet<&str> = ["A", "B", "C", "D"].into_iter().collect();
        let split = random_activity_split(&activities, 2);
        assert_eq!(split.len(), 2);
        let mut total = 0;
        for s in &split {
            assert!(!s.is_empty());
            total += s.len();
        }
        assert_eq!(total, activities.len());
    }

    #[test]
    fn activity_based_splitter_routes_events_by_activity() {
        let log = log_with_activities(&["A", "B", "C"]);
        let set_a: HashSet<&str> = ["A"].into_iter().collect();
        let set_bc: HashSet<&str> = ["B", "C"].into_iter().collect();
        let split_sets = vec![set_a, set_bc];

        let splitter = ActivityBasedEventLogSplitter::new(&log, &split_sets);
        assert!(splitter.check_split_set_validity());

        let result = splitter.split();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].traces[0].events.len(), 1);
        assert_eq!(result[1].traces[0].events.len(), 2);
    }

    #[test]
    fn random_splitter_preserves_total_event_count() {
        let log = log_with_activities(&["A", "B", "C", "D", "E"]);
        let mut splitter = RandomEventLogSplitter::new(&log, 3);
        let result = splitter.split();
        assert_eq!(result.len(), 3);
        let total: usize = result.iter().map(|l| l.traces[0].events.len()).sum();
        assert_eq!(total, 5);
    }
}
