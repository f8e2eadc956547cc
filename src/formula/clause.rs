use crate::{Assignments, Error, Evaluate, Literal, Variable};
use std::collections::BTreeSet;
use std::str::FromStr;

/// A disjunction of literals, stored as a set so that equality is
/// order-insensitive and duplicates collapse.
#[derive(Clone, Eq, PartialEq)]
pub struct Clause {
    literals: BTreeSet<Literal>,
}

/// How a clause stands under a partial assignment, computed in one pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Satisfied,
    Conflicting,
    Unit(Literal),
    Unresolved,
}

impl Clause {
    pub fn new(literals: BTreeSet<Literal>) -> Self {
        Self { literals }
    }

    pub fn literals(&self) -> impl Iterator<Item = Literal> + ExactSizeIterator + '_ {
        self.literals.iter().copied()
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + ExactSizeIterator + '_ {
        self.literals().map(Literal::var)
    }

    pub fn contains(&self, literal: Literal) -> bool {
        self.literals.contains(&literal)
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Whether the clause contains some literal together with its negation.
    pub fn is_tautology(&self) -> bool {
        self.literals().any(|literal| self.contains(!literal))
    }

    /// Whether some literal evaluates to true under `assignments`.
    pub fn is_satisfied(&self, assignments: &Assignments) -> bool {
        matches!(self.evaluate(assignments), Some(true))
    }

    /// Whether every literal is assigned and evaluates to false.
    pub fn is_conflicting(&self, assignments: &Assignments) -> bool {
        matches!(self.evaluate(assignments), Some(false))
    }

    /// The sole unassigned literal, if no literal is true and exactly one is
    /// unassigned. Aborts as soon as a second unassigned literal turns up.
    pub fn unit_literal(&self, assignments: &Assignments) -> Option<Literal> {
        let mut unit = None;
        for literal in self.literals() {
            match literal.evaluate(assignments) {
                Some(true) => return None,
                Some(false) => (),
                None if unit.is_some() => return None,
                None => unit = Some(literal),
            }
        }
        unit
    }

    pub fn status(&self, assignments: &Assignments) -> Status {
        let mut unit = None;
        let mut unassigned = 0;
        for literal in self.literals() {
            match literal.evaluate(assignments) {
                Some(true) => return Status::Satisfied,
                Some(false) => (),
                None => {
                    unit = Some(literal);
                    unassigned += 1;
                }
            }
        }
        match (unassigned, unit) {
            (0, _) => Status::Conflicting,
            (1, Some(literal)) => Status::Unit(literal),
            _ => Status::Unresolved,
        }
    }
}

impl Evaluate for Clause {
    fn evaluate(&self, assignments: &Assignments) -> Option<bool> {
        let mut all_false = true;
        for literal in self.literals() {
            match literal.evaluate(assignments) {
                Some(true) => return Some(true),
                Some(false) => (),
                None => all_false = false,
            }
        }
        if all_false {
            Some(false)
        } else {
            None
        }
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<I: IntoIterator<Item = Literal>>(literals: I) -> Self {
        Self {
            literals: literals.into_iter().collect(),
        }
    }
}

impl From<Vec<Literal>> for Clause {
    fn from(literals: Vec<Literal>) -> Self {
        literals.into_iter().collect()
    }
}

impl FromStr for Clause {
    type Err = Error;

    /// Parses a whitespace-separated list of signed integers, stopping at the
    /// DIMACS `0` terminator if one is present.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut literals = BTreeSet::new();
        for token in s.split_whitespace() {
            let parsed = token
                .parse::<isize>()
                .map_err(|_| Error::UnparsableLiteral(token.to_owned()))?;
            if parsed == 0 {
                break;
            }
            literals.insert(Literal::from(parsed));
        }
        Ok(Self { literals })
    }
}

impl std::fmt::Debug for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_list().entries(self.literals()).finish()
    }
}
