use crate::{DecisionLevel, Variable};
use thiserror::Error;

/// Failures surfaced by the solver.
///
/// The input kinds are raised before the search starts; the assignment and
/// backtrack kinds are invariant violations and abort the solve.
#[derive(Debug, Error)]
pub enum Error {
    /// The input contains an empty clause, which no assignment satisfies.
    #[error("input contains an empty clause")]
    EmptyClause,

    /// A clause line contained a token that is not a signed integer.
    #[error("unparsable literal {0:?}")]
    UnparsableLiteral(String),

    /// An assignment was requested for a variable that already holds a value.
    #[error("variable {0} is already assigned")]
    AlreadyAssigned(Variable),

    /// A backtrack was requested to a level above the current one.
    #[error("cannot backtrack to level {target} from level {current}")]
    InvalidBacktrack {
        target: DecisionLevel,
        current: DecisionLevel,
    },

    /// A problem file could not be read.
    #[error("cannot read problem file: {0}")]
    Io(#[from] std::io::Error),
}
