//! Object-centric query engine: express structural, behavioral, and object-type conditions
//! over process executions of an object-centric event log and evaluate them, full or live.
//!
//! The entry points most callers want are [`ast::Query`] (build or deserialize a query),
//! [`log_index::LogIndex`] (index a log and its process executions once), and [`driver::execute`]
//! / [`driver::execute_live`] (run a query).

/// Index over an [`crate::ocel::linked_ocel::IndexLinkedOCEL`] and its process executions
pub mod log_index;

/// Errors raised while converting, evaluating, or driving a query
pub mod error;

/// The query AST
pub mod ast;

/// Witnesses emitted alongside a satisfied query
pub mod witness;

/// Conversion from legacy flat-record and graphical-diagram query representations
pub mod converter;

/// `Φ(q, p) -> bool` evaluation of a [`ast::Query`] against one process execution
pub mod evaluator;

/// Path enumeration, sub-query ordering, and OR-split/OR-join resolution
pub mod planner;

/// External per-event metric source consumed by the evaluator
pub mod metrics;

/// Full- and live-mode execution across a log's process executions
pub mod driver;

/// Subset-log export of matched process executions
pub mod export;

pub use ast::Query;
pub use driver::{execute, execute_live, execute_par, QueryEngineConfig, QueryResult, QueryRunMeta};
pub use error::{ConversionError, DriverError, EvalError};
pub use log_index::{ExecutionGraph, ExecutionIndex, LogIndex, ProcessExecutionIndex};
pub use metrics::{MetricSource, MetricTable};
pub use witness::Witness;
