///
/// Errors that can occur while converting a legacy query record or a graphical query
/// diagram into a [`super::ast::Query`]
///
#[derive(Debug, Clone)]
pub enum ConversionError {
    /// A required field was absent from the input record
    MissingField(String),
    /// The `query` tag of a legacy record was not one of the known kinds
    UnknownQueryTag(String),
    /// A `NOT` (logical operator) node did not have exactly one operand
    InvalidNotArity(usize),
    /// A query node referenced an activity or object type that does not exist in the log,
    /// and the converter was run in strict mode
    UnknownName(String),
    /// A graphical diagram had more than one logical-operator root and no unambiguous choice
    AmbiguousRoot,
    /// The diagram contained a reference to a node id that does not exist
    DanglingReference(String),
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionError::MissingField(field) => {
                write!(f, "Missing required field '{field}'")
            }
            ConversionError::UnknownQueryTag(tag) => {
                write!(f, "Unknown query tag '{tag}'")
            }
            ConversionError::InvalidNotArity(n) => {
                write!(f, "NOT expects exactly one operand, got {n}")
            }
            ConversionError::UnknownName(name) => {
                write!(f, "Unknown activity or object type '{name}'")
            }
            ConversionError::AmbiguousRoot => {
                write!(f, "Diagram has multiple ambiguous logical-operator roots")
            }
            ConversionError::DanglingReference(id) => {
                write!(f, "Reference to unknown node id '{id}'")
            }
        }
    }
}

impl std::error::Error for ConversionError {}

///
/// Errors raised by the Evaluator, indicating that a malformed query AST reached
/// evaluation (a planner or converter defect, not a user-facing condition)
///
#[derive(Debug, Clone)]
pub enum EvalError {
    /// A composed query variant had the wrong number of operands for its operator
    InvalidArity {
        /// Name of the operator (`AND`, `OR`, `NOT`)
        operator: &'static str,
        /// Number of operands actually present
        found: usize,
    },
    /// A required component was missing after conversion
    MissingComponent(&'static str),
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::InvalidArity { operator, found } => {
                write!(f, "Invalid arity for {operator}: found {found} operands")
            }
            EvalError::MissingComponent(name) => {
                write!(f, "Missing required component '{name}' after conversion")
            }
        }
    }
}

impl std::error::Error for EvalError {}

///
/// Errors raised by the Driver while executing a query across process executions
///
#[derive(Debug, Clone)]
pub enum DriverError {
    /// An evaluation-time invariant was violated
    Eval(EvalError),
    /// Live mode exceeded its configured wall-clock budget without finding a match
    Timeout,
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverError::Eval(e) => write!(f, "Evaluation error: {e}"),
            DriverError::Timeout => write!(f, "Live query timed out before finding a match"),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<EvalError> for DriverError {
    fn from(value: EvalError) -> Self {
        DriverError::Eval(value)
    }
}
