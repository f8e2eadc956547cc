mod activity;
mod assignments;
mod clause_db;
mod conflict;
mod error;
pub mod formula;
mod history;
mod literal;
mod logging;
mod sign;
mod solver;

use activity::Activities;
use assignments::{Assignment, Assignments};
use clause_db::ClauseDb;
use conflict::Conflict;
pub use error::Error;
pub use formula::Formula;
use history::History;
pub use literal::Literal;
pub use sign::Sign;
pub use solver::{Solution, Solver};

pub type Variable = usize;
type ClauseIdx = usize;
type DecisionLevel = usize;

trait Evaluate {
    fn evaluate(&self, assignments: &Assignments) -> Option<bool>;
}
