use crate::{DecisionLevel, Error, History, Sign, Variable};

pub mod assignment;
pub use assignment::Assignment;

/// The per-variable side of the trail: each variable's current value, level
/// and antecedent, plus the phase it last held for the decision heuristic.
#[derive(Clone, Debug)]
pub struct Assignments {
    assignments: Vec<Option<Assignment>>,
    phases: Vec<Sign>,
}

impl Assignments {
    pub fn new(num_vars: usize) -> Self {
        Self {
            assignments: vec![None; num_vars],
            phases: vec![Sign::Negative; num_vars],
        }
    }

    pub fn get(&self, var: Variable) -> Option<&Assignment> {
        self.assignments[var].as_ref()
    }

    pub fn set(
        &mut self,
        var: Variable,
        assignment: Assignment,
        history: &mut History,
    ) -> Result<(), Error> {
        if self.assignments[var].is_some() {
            return Err(Error::AlreadyAssigned(var));
        }
        self.phases[var] = assignment.sign();
        self.assignments[var] = Some(assignment);
        history.record(var);
        Ok(())
    }

    pub fn remove(&mut self, var: Variable) {
        self.assignments[var] = None;
    }

    pub fn is_assigned(&self, var: Variable) -> bool {
        self.assignments[var].is_some()
    }

    pub fn assigned_at_level(&self, var: Variable, level: DecisionLevel) -> bool {
        self.get(var)
            .map(|assignment| assignment.decision_level() == level)
            .unwrap_or(false)
    }

    /// The sign the variable held when last assigned, defaulting to negative
    /// for variables that have never been touched.
    pub fn last_sign(&self, var: Variable) -> Sign {
        self.phases[var]
    }

    /// Consumes the store into a total model, filling any hole with the
    /// variable's saved phase.
    pub fn into_model(self) -> impl Iterator<Item = (Variable, Sign)> {
        self.assignments
            .into_iter()
            .zip(self.phases)
            .map(|(assignment, phase)| assignment.map_or(phase, |a| a.sign()))
            .enumerate()
    }
}
