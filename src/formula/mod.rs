pub mod clause;

use crate::{solver::Solution, Error, Literal, Sign, Solver, Variable};
pub use clause::Clause;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// A CNF formula over externally-numbered variables, as handed to the solver.
pub struct Formula {
    pub clauses: Vec<Clause>,
}

impl Formula {
    /// Parses one clause per line, skipping DIMACS comment and problem lines.
    pub fn parse(lines: impl IntoIterator<Item = impl AsRef<str>>) -> Result<Self, Error> {
        let clauses = lines
            .into_iter()
            .filter(|l| {
                let l = l.as_ref();
                !l.is_empty() && !l.starts_with('c') && !l.starts_with('p') && !l.starts_with('%')
            })
            .map(|l| l.as_ref().parse::<Clause>())
            .filter(|c| !matches!(c, Ok(c) if c.is_empty()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { clauses })
    }

    pub fn parse_and_solve(
        lines: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Solution<impl IntoIterator<Item = (Variable, Sign)>>, Error> {
        Self::parse(lines).and_then(Solver::solve_formula)
    }

    pub fn parse_and_solve_file(
        path: impl AsRef<Path>,
    ) -> Result<Solution<impl IntoIterator<Item = (Variable, Sign)>>, Error> {
        let lines = File::open(path).map(|f| BufReader::new(f).lines().map_while(Result::ok))?;

        Formula::parse_and_solve(lines)
    }

    pub fn solve(self) -> Result<Solution<impl IntoIterator<Item = (Variable, Sign)>>, Error> {
        Solver::solve_formula(self)
    }

    pub fn all_literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.clauses.iter().flat_map(|clause| clause.literals())
    }

    pub fn all_variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.all_literals().map(|literal| literal.var())
    }

    /// The variable universe of the formula, sorted and deduplicated.
    pub fn distinct_variables(&self) -> Vec<Variable> {
        let mut vars = self.all_variables().collect::<Vec<Variable>>();
        vars.sort_unstable();
        vars.dedup();
        vars
    }
}

impl From<Vec<Vec<Literal>>> for Formula {
    fn from(clauses: Vec<Vec<Literal>>) -> Self {
        Self {
            clauses: clauses.into_iter().map(|v| v.into()).collect(),
        }
    }
}

impl From<Vec<Vec<isize>>> for Formula {
    fn from(clauses: Vec<Vec<isize>>) -> Self {
        clauses
            .into_iter()
            .map(|clause| clause.into_iter().map(Literal::from).collect::<Vec<_>>())
            .collect::<Vec<_>>()
            .into()
    }
}
