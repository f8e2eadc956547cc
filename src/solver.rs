use crate::{
    formula::{self, clause},
    logging, Activities, Assignment, Assignments, ClauseDb, ClauseIdx, Conflict, DecisionLevel,
    Error, History, Literal, Sign, Variable,
};
use std::collections::BTreeMap;

/// The search driver: owns the clause database, the trail and the decision
/// heuristic, and runs decide / propagate / analyse / backjump to a verdict.
pub struct Solver {
    num_variables: usize,
    clauses: ClauseDb,
    assignments: Assignments,
    history: History,
    activities: Activities,
    conflict: Conflict,
    stats: Stats,
}

pub enum Solution<T: IntoIterator<Item = (Variable, Sign)>> {
    Sat(T),
    Unsat,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Verdict {
    Sat,
    Unsat,
}

/// What a round of propagation ended with.
#[must_use]
enum Propagation {
    FixedPoint,
    Conflict(ClauseIdx),
}

#[derive(Clone, Copy, Debug, Default)]
struct Stats {
    decisions: u64,
    propagations: u64,
    conflicts: u64,
}

impl Solver {
    /// Conditions a formula the way the search wants it (tautologies
    /// dropped, variables renumbered onto `0..n`), then searches, mapping
    /// any model back onto the formula's own variable numbering.
    pub fn solve_formula(
        formula: impl Into<formula::Formula>,
    ) -> Result<Solution<impl IntoIterator<Item = (Variable, Sign)>>, Error> {
        let formula = formula.into();

        // Mapping from [0, num_vars) -> external variable id, and its inverse
        let variables = formula.distinct_variables();
        let map = variables
            .iter()
            .enumerate()
            .map(|(idx, id)| (*id, idx as Variable))
            .collect::<BTreeMap<Variable, Variable>>();

        let mut clauses = Vec::with_capacity(formula.clauses.len());
        for clause in &formula.clauses {
            if clause.is_empty() {
                return Err(Error::EmptyClause);
            }
            if clause.is_tautology() {
                continue;
            }
            clauses.push(
                clause
                    .literals()
                    .map(|literal| Literal::new(map[&literal.var()], literal.sign()))
                    .collect(),
            );
        }

        let mut solver = Self::with_clauses(variables.len(), clauses);
        Ok(match solver.search()? {
            Verdict::Unsat => Solution::Unsat,
            Verdict::Sat => Solution::Sat(
                solver
                    .assignments
                    .into_model()
                    .map(move |(var, sign)| (variables[var], sign)),
            ),
        })
    }

    /// A solver over variables already numbered `0..num_variables`.
    fn with_clauses(num_variables: usize, clauses: Vec<formula::Clause>) -> Self {
        let mut db = ClauseDb::new(clauses.len());
        for clause in clauses {
            db.add_original(clause);
        }
        Self {
            num_variables,
            clauses: db,
            assignments: Assignments::new(num_variables),
            history: History::new(num_variables),
            activities: Activities::new(num_variables),
            conflict: Conflict::new(num_variables),
            stats: Stats::default(),
        }
    }

    fn search(&mut self) -> Result<Verdict, Error> {
        // Close off the consequences of the input units before any decision
        if let Propagation::Conflict(_) = self.propagate_to_fixed_point()? {
            self.log_stats();
            return Ok(Verdict::Unsat);
        }

        while !self.all_variables_assigned() {
            let Some(decision) = self.activities.next_decision(&self.assignments) else {
                break;
            };
            self.decide(decision)?;

            let mut outcome = self.propagate_to_fixed_point()?;
            while let Propagation::Conflict(conflict) = outcome {
                self.stats.conflicts += 1;
                if self.current_level() == 0 {
                    self.log_stats();
                    return Ok(Verdict::Unsat);
                }

                let (learned, target) = self.analyze_conflict(conflict);
                let learned = self.clauses.add_learned(learned);
                self.activities.bump_clause(&self.clauses[learned]);
                self.activities.decay();
                self.backtrack(target)?;

                outcome = self.propagate_to_fixed_point()?;
            }
        }

        self.log_stats();
        Ok(Verdict::Sat)
    }

    fn all_variables_assigned(&self) -> bool {
        self.history.num_assigned() == self.num_variables
    }

    fn current_level(&self) -> DecisionLevel {
        self.history.current_level()
    }

    fn decide(&mut self, literal: Literal) -> Result<(), Error> {
        self.history.new_decision_level();
        self.stats.decisions += 1;
        log::trace!(
            target: logging::DECISION,
            "deciding {} at level {}",
            literal,
            self.current_level()
        );
        self.assignments.set(
            literal.var(),
            Assignment::decided(literal.sign(), self.current_level()),
            &mut self.history,
        )
    }

    /// The baseline BCP: sweep every known clause, assign each unit literal
    /// with its clause as antecedent, and sweep again until a full pass
    /// changes nothing. The first conflicting clause ends the round.
    fn propagate_to_fixed_point(&mut self) -> Result<Propagation, Error> {
        loop {
            let mut changed = false;
            for idx in 0..self.clauses.len() {
                match self.clauses[idx].status(&self.assignments) {
                    clause::Status::Satisfied | clause::Status::Unresolved => (),
                    clause::Status::Conflicting => {
                        log::trace!(
                            target: logging::PROPAGATION,
                            "conflict on {:?} at level {}",
                            self.clauses[idx],
                            self.current_level()
                        );
                        return Ok(Propagation::Conflict(idx));
                    }
                    clause::Status::Unit(literal) => {
                        self.stats.propagations += 1;
                        log::trace!(
                            target: logging::PROPAGATION,
                            "{:?} implies {}",
                            self.clauses[idx],
                            literal
                        );
                        self.assignments.set(
                            literal.var(),
                            Assignment::implied(literal.sign(), idx, self.current_level()),
                            &mut self.history,
                        )?;
                        changed = true;
                    }
                }
            }
            if !changed {
                return Ok(Propagation::FixedPoint);
            }
        }
    }

    /// First-UIP analysis: resolve the conflicting clause backwards along
    /// the trail until a single literal of the current level remains.
    fn analyze_conflict(&mut self, conflict: ClauseIdx) -> (formula::Clause, DecisionLevel) {
        let level = self.current_level();
        debug_assert!(level >= 1);

        self.conflict
            .initialize(level, &self.clauses[conflict], &self.assignments);

        for var in self.history.newest_first() {
            if self.conflict.at_conflict_level() <= 1 {
                break;
            }
            let Some(assignment) = self.assignments.get(var) else {
                continue;
            };
            if assignment.decision_level() != level {
                continue;
            }
            let pivot = !Literal::new(var, assignment.sign());
            if !self.conflict.contains(pivot) {
                continue;
            }
            // The level's decision has no antecedent to resolve against
            let Some(antecedent) = assignment.antecedent() else {
                continue;
            };
            self.conflict
                .resolve(pivot, &self.clauses[antecedent], &self.assignments);
        }

        let learned = self.conflict.literals().collect::<formula::Clause>();
        let target = self.conflict.backjump_level(level, &self.assignments);
        log::debug!(
            target: logging::ANALYSIS,
            "learned {:?}, backjumping to level {}",
            learned,
            target
        );
        (learned, target)
    }

    fn backtrack(&mut self, target: DecisionLevel) -> Result<(), Error> {
        let current = self.current_level();
        if target > current {
            return Err(Error::InvalidBacktrack { target, current });
        }
        log::trace!(
            target: logging::BACKJUMP,
            "backjumping from level {} to level {}",
            current,
            target
        );
        self.history
            .revert_to(target, &mut self.assignments, &mut self.activities);
        Ok(())
    }

    fn log_stats(&self) {
        log::debug!(
            target: logging::SEARCH,
            "search finished: {} decisions, {} propagations, {} conflicts, {} learned clauses",
            self.stats.decisions,
            self.stats.propagations,
            self.stats.conflicts,
            self.clauses.learned_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{Solver, Verdict};
    use crate::{formula::Formula, Evaluate, Literal, Sign, Solution};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Builds a solver over densely-numbered variables from signed-integer
    /// clauses, mapping external id `v` to internal variable `v - 1`.
    fn solver(num_variables: usize, clauses: Vec<Vec<isize>>) -> Solver {
        let clauses = clauses
            .into_iter()
            .map(|clause| {
                clause
                    .into_iter()
                    .map(|lit| Literal::new(lit.unsigned_abs() - 1, lit > 0))
                    .collect()
            })
            .collect();
        Solver::with_clauses(num_variables, clauses)
    }

    /// Does some total assignment satisfy every clause? Exhaustive, for
    /// cross-checking verdicts on small instances.
    fn reference_satisfiable(num_variables: usize, clauses: &[Vec<isize>]) -> bool {
        assert!(num_variables < 24);
        (0..1u32 << num_variables).any(|bits| {
            clauses.iter().all(|clause| {
                clause.iter().any(|lit| {
                    let value = bits >> (lit.unsigned_abs() - 1) & 1 == 1;
                    (*lit > 0) == value
                })
            })
        })
    }

    #[test]
    fn trivial_sat() -> Result<(), crate::Error> {
        let formula: Formula = vec![vec![1]].into();
        match formula.solve()? {
            Solution::Unsat => panic!("expected Sat, got Unsat"),
            Solution::Sat(model) => {
                let model = model.into_iter().collect::<Vec<_>>();
                assert!(model.contains(&(1, Sign::Positive)));
                Ok(())
            }
        }
    }

    #[test]
    fn trivial_unsat_is_caught_by_initial_propagation() {
        let mut solver = solver(1, vec![vec![1], vec![-1]]);
        assert_eq!(solver.search().unwrap(), Verdict::Unsat);
        assert_eq!(solver.stats.decisions, 0);
    }

    #[test]
    fn forced_chain_assigns_everything_at_level_zero() {
        let mut solver = solver(3, vec![vec![1], vec![-1, 2], vec![-2, 3]]);
        assert_eq!(solver.search().unwrap(), Verdict::Sat);
        for var in 0..3 {
            let assignment = solver.assignments.get(var).unwrap();
            assert_eq!(assignment.sign(), Sign::Positive);
            assert_eq!(assignment.decision_level(), 0);
            assert!(assignment.antecedent().is_some());
        }
        assert_eq!(solver.stats.decisions, 0);
    }

    #[test]
    fn unsat_triangle_learns_before_concluding() {
        let mut solver = solver(2, vec![vec![1, 2], vec![1, -2], vec![-1, 2], vec![-1, -2]]);
        assert_eq!(solver.search().unwrap(), Verdict::Unsat);
        assert!(solver.clauses.learned_count() >= 1);
        assert_eq!(solver.current_level(), 0);
    }

    #[test]
    fn first_uip_is_asserted_after_the_backjump() {
        // Deciding -1 forces 2 (via [1, 2]) and then 3 (via [-2, 3]),
        // falsifying [-2, -3]; resolution stops at the unique implication
        // point -2, which the resumed propagation asserts at level 0.
        let mut solver = solver(3, vec![vec![1, 2], vec![-2, 3], vec![-2, -3]]);
        assert_eq!(solver.search().unwrap(), Verdict::Sat);
        assert_eq!(solver.clauses.learned_count(), 1);

        let learned = &solver.clauses[3];
        assert_eq!(
            learned.literals().collect::<Vec<_>>(),
            vec![Literal::new(1, Sign::Negative)]
        );

        let assignment = solver.assignments.get(1).unwrap();
        assert_eq!(assignment.sign(), Sign::Negative);
        assert_eq!(assignment.decision_level(), 0);
        assert_eq!(assignment.antecedent(), Some(3));
    }

    #[test]
    fn pigeonhole_three_into_two() {
        // Variable h * 3 + p + 1 puts pigeon p in hole h
        let mut clauses = (0..3)
            .map(|p| vec![p + 1, p + 4])
            .collect::<Vec<Vec<isize>>>();
        for h in 0..2isize {
            for p in 0..3isize {
                for q in (p + 1)..3 {
                    clauses.push(vec![-(h * 3 + p + 1), -(h * 3 + q + 1)]);
                }
            }
        }
        assert_eq!(clauses.len(), 9);

        let mut solver = solver(6, clauses);
        assert_eq!(solver.search().unwrap(), Verdict::Unsat);
    }

    #[test]
    fn trail_levels_are_monotone_and_antecedents_hold() {
        let mut solver = solver(
            4,
            vec![vec![1, 2, 3], vec![-1, -2], vec![-2, -3], vec![2, 3, -4], vec![1, 4]],
        );
        assert_eq!(solver.search().unwrap(), Verdict::Sat);

        let levels = solver
            .history
            .trail()
            .iter()
            .map(|&var| solver.assignments.get(var).unwrap().decision_level())
            .collect::<Vec<_>>();
        assert!(levels.windows(2).all(|w| w[0] <= w[1]));

        for &var in solver.history.trail() {
            let assignment = solver.assignments.get(var).unwrap();
            let Some(antecedent) = assignment.antecedent() else {
                continue;
            };
            for literal in solver.clauses[antecedent].literals() {
                if literal.var() == var {
                    assert_eq!(literal.sign(), assignment.sign());
                } else {
                    assert_eq!(literal.evaluate(&solver.assignments), Some(false));
                    let level = solver
                        .assignments
                        .get(literal.var())
                        .unwrap()
                        .decision_level();
                    assert!(level <= assignment.decision_level());
                }
            }
        }
    }

    #[test]
    fn seeded_random_3sat_matches_reference() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let num_variables = 20;

        let clauses = (0..60)
            .map(|_| {
                let mut vars = Vec::with_capacity(3);
                while vars.len() < 3 {
                    let var = rng.gen_range(1..=num_variables as isize);
                    if !vars.contains(&var) {
                        vars.push(var);
                    }
                }
                vars.into_iter()
                    .map(|var| if rng.gen_bool(0.5) { var } else { -var })
                    .collect::<Vec<isize>>()
            })
            .collect::<Vec<_>>();

        let expected = reference_satisfiable(num_variables, &clauses);
        let formula: Formula = clauses.clone().into();
        match formula.solve().unwrap() {
            Solution::Unsat => assert!(!expected),
            Solution::Sat(model) => {
                assert!(expected);
                let model = model.into_iter().collect::<std::collections::BTreeMap<_, _>>();
                for clause in &clauses {
                    assert!(clause.iter().any(|lit| {
                        model[&(lit.unsigned_abs())] == Sign::from(*lit > 0)
                    }));
                }
            }
        }
    }

    #[test]
    fn tautologies_are_discarded_before_the_search() {
        let formula: Formula = vec![vec![1, -1], vec![2]].into();
        assert!(matches!(formula.solve(), Ok(Solution::Sat(_))));
    }

    #[test]
    fn empty_clauses_are_rejected() {
        let formula: Formula = vec![vec![1], vec![]].into();
        assert!(matches!(formula.solve(), Err(crate::Error::EmptyClause)));
    }

    #[quickcheck_macros::quickcheck]
    fn verdict_agrees_with_reference(raw: Vec<Vec<i8>>) {
        let clauses = raw
            .into_iter()
            .map(|clause| {
                clause
                    .into_iter()
                    .map(|lit| {
                        let var = (lit.unsigned_abs() as isize % 10) + 1;
                        if lit < 0 {
                            -var
                        } else {
                            var
                        }
                    })
                    .collect::<Vec<isize>>()
            })
            .filter(|clause| !clause.is_empty())
            .take(30)
            .collect::<Vec<_>>();

        let expected = reference_satisfiable(11, &clauses);
        let formula: Formula = clauses.clone().into();
        match formula.solve().unwrap() {
            Solution::Unsat => assert!(!expected),
            Solution::Sat(model) => {
                assert!(expected);
                let model = model.into_iter().collect::<std::collections::BTreeMap<_, _>>();
                for clause in &clauses {
                    assert!(clause.iter().any(|lit| {
                        model[&(lit.unsigned_abs())] == Sign::from(*lit > 0)
                    }));
                }
            }
        }
    }
}
