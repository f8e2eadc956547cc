use crate::{formula::Clause, logging, Assignments, DecisionLevel, Evaluate, Literal, Variable};
use fixedbitset::FixedBitSet;
use std::collections::BTreeSet;

/// The resolvent of a conflict analysis walk: a set of literal codes plus a
/// running count of how many sit at the conflict level. The walk is over
/// once that count drops to one, at which point the remaining current-level
/// literal is the first unique implication point.
pub struct Conflict {
    level: DecisionLevel,
    literals: FixedBitSet,
    at_conflict_level: usize,
}

impl Conflict {
    pub fn new(num_vars: usize) -> Self {
        Self {
            level: 0,
            literals: FixedBitSet::with_capacity(num_vars * 2),
            at_conflict_level: 0,
        }
    }

    /// Seeds the resolvent with the literals of a conflicting clause.
    pub fn initialize(&mut self, level: DecisionLevel, clause: &Clause, assignments: &Assignments) {
        self.literals.clear();
        self.level = level;
        self.at_conflict_level = 0;

        for literal in clause.literals() {
            self.add(literal, assignments);
        }

        debug_assert_ne!(
            self.at_conflict_level, 0,
            "a conflicting clause must contain a literal from the conflict level"
        );
    }

    pub fn at_conflict_level(&self) -> usize {
        self.at_conflict_level
    }

    pub fn contains(&self, literal: Literal) -> bool {
        self.literals.contains(literal.code())
    }

    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.literals.ones().map(Literal::from_code)
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.literals().map(Literal::var)
    }

    fn add(&mut self, literal: Literal, assignments: &Assignments) {
        // A resolvent never holds both polarities of a variable; both being
        // false under the assignment is impossible
        if self.literals.contains((!literal).code()) {
            return;
        }
        if !self.literals.put(literal.code())
            && assignments.assigned_at_level(literal.var(), self.level)
        {
            self.at_conflict_level += 1;
        }
    }

    /// Resolves the resolvent against the antecedent of the pivot's variable:
    /// the pivot leaves, and every antecedent literal over another variable
    /// joins unless either of its polarities is already present.
    pub fn resolve(&mut self, pivot: Literal, antecedent: &Clause, assignments: &Assignments) {
        debug_assert!(self.contains(pivot));
        debug_assert!(antecedent.contains(!pivot));

        self.literals.set(pivot.code(), false);
        self.at_conflict_level -= 1;

        for literal in antecedent.literals() {
            if literal.var() != pivot.var() {
                self.add(literal, assignments);
            }
        }
    }

    /// The level to jump back to so that the learned clause becomes unit:
    /// the highest level among its literals below the conflict level, or 0
    /// when the clause has no second level to offer.
    pub fn backjump_level(
        &self,
        conflict_level: DecisionLevel,
        assignments: &Assignments,
    ) -> DecisionLevel {
        debug_assert!(self
            .literals()
            .all(|literal| matches!(literal.evaluate(assignments), Some(false))));

        let levels = self
            .variables()
            .filter_map(|var| assignments.get(var).map(|a| a.decision_level()))
            .collect::<BTreeSet<DecisionLevel>>();

        let mut levels = levels.into_iter().rev();
        match (levels.next(), levels.next()) {
            (_, None) => 0,
            (Some(highest), Some(second)) if highest == conflict_level => second,
            (Some(highest), Some(_)) => {
                // Reachable only if the walk stopped before isolating a
                // current-level literal
                log::warn!(
                    target: logging::ANALYSIS,
                    "resolvent's highest level {} is below the conflict level {}",
                    highest,
                    conflict_level
                );
                highest
            }
            (None, Some(_)) => unreachable!(),
        }
    }
}
