use crate::{ClauseIdx, DecisionLevel, Sign};

/// How a variable came to hold its sign: picked by the heuristic at the start
/// of a level, or forced by a unit clause. The antecedent is absent exactly
/// when the assignment was a decision.
#[derive(Clone, Copy, Debug)]
pub struct Assignment {
    sign: Sign,
    antecedent: Option<ClauseIdx>,
    decision_level: DecisionLevel,
}

impl Assignment {
    pub fn decided(sign: Sign, decision_level: DecisionLevel) -> Self {
        Self {
            sign,
            antecedent: None,
            decision_level,
        }
    }

    pub fn implied(sign: Sign, antecedent: ClauseIdx, decision_level: DecisionLevel) -> Self {
        Self {
            sign,
            antecedent: Some(antecedent),
            decision_level,
        }
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn antecedent(&self) -> Option<ClauseIdx> {
        self.antecedent
    }

    pub fn decision_level(&self) -> DecisionLevel {
        self.decision_level
    }
}
