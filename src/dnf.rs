//! Goal formulas in disjunctive normal form.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parse::Relation;

/// One polarity-tagged relation over object ids (or the `"floor"`
/// sentinel). `holding` takes one argument, every other relation two.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub polarity: bool,
    pub relation: Relation,
    pub args: Vec<String>,
}

impl Literal {
    pub fn holding(id: &str) -> Self {
        Self { polarity: true, relation: Relation::Holding, args: vec![id.to_owned()] }
    }

    pub fn binary(relation: Relation, a: &str, b: &str) -> Self {
        Self { polarity: true, relation, args: vec![a.to_owned(), b.to_owned()] }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.polarity {
            write!(f, "-")?;
        }
        write!(f, "{}({})", self.relation, self.args.join(","))
    }
}

/// All literals of a conjunction must hold at once.
pub type Conjunction = Vec<Literal>;

/// A disjunction of conjunctions; satisfied iff any conjunction is. Disjunct
/// order is the emission order of the interpreter and is observable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dnf(pub Vec<Conjunction>);

impl fmt::Display for Dnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_conjunction(f: &mut fmt::Formatter<'_>, conjunction: &[Literal]) -> fmt::Result {
            let mut literals = conjunction.iter();
            literals.by_ref().take(1).try_for_each(|l| write!(f, "{}", l))?;
            literals.try_for_each(|l| write!(f, " & {}", l))
        }
        let mut disjuncts = self.0.iter();
        match disjuncts.next() {
            Some(first) => write_conjunction(f, first)?,
            None => return write!(f, "false"),
        }
        for conjunction in disjuncts {
            write!(f, " | ")?;
            write_conjunction(f, conjunction)?;
        }
        Ok(())
    }
}
