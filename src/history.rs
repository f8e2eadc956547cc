use crate::{Activities, Assignments, DecisionLevel, Variable};

/// The ordered side of the trail: variables in assignment order, plus the
/// trail index at which each decision level starts. The current level is the
/// number of breaks, so there is a single source of truth for the depth.
#[derive(Clone, Debug)]
pub struct History {
    trail: Vec<Variable>,
    decision_level_breaks: Vec<usize>,
}

impl History {
    pub fn new(num_vars: usize) -> Self {
        Self {
            trail: Vec::with_capacity(num_vars),
            decision_level_breaks: Vec::new(),
        }
    }

    pub fn record(&mut self, var: Variable) {
        self.trail.push(var);
    }

    pub fn new_decision_level(&mut self) {
        self.decision_level_breaks.push(self.trail.len());
    }

    pub fn current_level(&self) -> DecisionLevel {
        self.decision_level_breaks.len()
    }

    pub fn num_assigned(&self) -> usize {
        self.trail.len()
    }

    pub fn trail(&self) -> &[Variable] {
        &self.trail
    }

    pub fn newest_first(&self) -> impl Iterator<Item = Variable> + '_ {
        self.trail().iter().rev().copied()
    }

    /// Pops every trail entry above `level`, unassigning each variable and
    /// handing it back to the decision heuristic. Entries at or below `level`
    /// are untouched, including the decision that opened `level` itself.
    pub fn revert_to(
        &mut self,
        level: DecisionLevel,
        assignments: &mut Assignments,
        activities: &mut Activities,
    ) {
        if level < self.decision_level_breaks.len() {
            let new_end = self.decision_level_breaks[level];
            for var in self.trail.drain(new_end..) {
                assignments.remove(var);
                activities.make_available(var);
            }
            self.decision_level_breaks.truncate(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::History;
    use crate::{Activities, Assignment, Assignments, Sign};

    #[test]
    fn rewriting_history() {
        let mut history = History::new(5);
        let mut assignments = Assignments::new(5);
        let mut activities = Activities::new(5);

        let mut set = |history: &mut History, level, var| {
            assignments
                .set(var, Assignment::decided(Sign::Positive, level), history)
                .unwrap();
        };

        // Decision level 0
        set(&mut history, 0, 0);

        // Decision level 1
        history.new_decision_level();
        set(&mut history, 1, 1);
        set(&mut history, 1, 2);

        // Decision level 2
        history.new_decision_level();
        set(&mut history, 2, 3);
        set(&mut history, 2, 4);

        assert_eq!(history.current_level(), 2);

        {
            let (mut history, mut assignments) = (history.clone(), assignments.clone());
            history.revert_to(0, &mut assignments, &mut activities);
            assert_eq!(history.trail, vec![0]);
            assert_eq!(history.decision_level_breaks, vec![]);
            assert!(assignments.is_assigned(0));
            assert!(!assignments.is_assigned(1));
            assert!(!assignments.is_assigned(4));
        }

        {
            let (mut history, mut assignments) = (history.clone(), assignments.clone());
            history.revert_to(1, &mut assignments, &mut activities);
            assert_eq!(history.trail, vec![0, 1, 2]);
            assert_eq!(history.decision_level_breaks, vec![1]);
            assert!(assignments.is_assigned(2));
            assert!(!assignments.is_assigned(3));
        }

        // Reverting to the current level leaves everything in place.
        history.revert_to(2, &mut assignments, &mut activities);
        assert_eq!(history.trail, vec![0, 1, 2, 3, 4]);
        assert_eq!(history.decision_level_breaks, vec![1, 3]);
    }
}
