//! Turns interpreted goals into concrete arm-action plans via best-first
//! search over the state graph.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dnf::{Dnf, Literal};
use crate::error::Error;
use crate::interpreter::Interpretation;
use crate::parse::Relation;
use crate::physics;
use crate::search;
use crate::state::{Action, Node, StateGraph};
use crate::world::{Form, ObjectInfo, WorldState};

/// The single utterance of an empty but successful plan.
pub const ALREADY_TRUE: &str = "That is already true!";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A finished plan: utterances (starting with a capital letter) interleaved
/// with the one-letter action codes `p`, `d`, `l`, `r`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<String>,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut steps = self.steps.iter();
        steps.by_ref().take(1).try_for_each(|s| write!(f, "{}", s))?;
        steps.try_for_each(|s| write!(f, "\n{}", s))
    }
}

pub struct Planner {
    pub timeout: Duration,
}

impl Default for Planner {
    fn default() -> Self {
        Self { timeout: DEFAULT_TIMEOUT }
    }
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Plans every interpretation against `world`. Failures of individual
    /// interpretations are suppressed as long as any succeeds; otherwise the
    /// first captured error is returned.
    pub fn plan(
        &self,
        interpretations: &[Interpretation],
        world: &WorldState,
    ) -> Result<Vec<Plan>, Error> {
        world.validate()?;
        let mut plans = Vec::new();
        let mut first_error = None;
        for interpretation in interpretations {
            match self.plan_interpretation(&interpretation.goal, world) {
                Ok(steps) => plans.push(Plan { steps }),
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }
        if plans.is_empty() {
            Err(first_error.unwrap_or(Error::NoInterpretation))
        } else {
            Ok(plans)
        }
    }

    fn plan_interpretation(&self, goal: &Dnf, world: &WorldState) -> Result<Vec<String>, Error> {
        debug!(%goal, "searching for a plan");
        let graph = StateGraph::new(&world.objects);
        let objects = &world.objects;
        let path = search::best_first(
            &graph,
            Node::from_world(world),
            |node| is_goal(goal, node, objects),
            |node| estimate(goal, node, objects),
            self.timeout,
        )?;
        let mut steps = Vec::new();
        for i in 1..path.nodes.len() {
            let node = &path.nodes[i];
            let action = match node.last_action {
                Some(action) => action,
                None => continue,
            };
            match action {
                Action::Pick => {
                    if let Some(id) = node.holding.as_deref() {
                        let verb = if i + 1 == path.nodes.len() { "Taking" } else { "Moving" };
                        steps.push(format!("{} the {}", verb, describe(id, objects)));
                    }
                }
                Action::Drop => {
                    if let Some(id) = path.nodes[i - 1].holding.as_deref() {
                        steps.push(format!(
                            "Dropping the {}{}",
                            describe(id, objects),
                            support_phrase(node, objects)
                        ));
                    }
                }
                Action::Left | Action::Right => {}
            }
            steps.push(action.code().to_owned());
        }
        if steps.is_empty() {
            steps.push(ALREADY_TRUE.to_owned());
        }
        Ok(steps)
    }
}

fn describe(id: &str, objects: &HashMap<String, ObjectInfo>) -> String {
    objects.get(id).map(ObjectInfo::description).unwrap_or_else(|| id.to_owned())
}

/// Where the dropped object came to rest, as a phrase: on the floor, inside
/// a box, or on top of whatever else supports it.
fn support_phrase(node: &Node, objects: &HashMap<String, ObjectInfo>) -> String {
    let column = &node.stacks[node.arm];
    if column.len() <= 1 {
        return " on the floor".to_owned();
    }
    let below = &column[column.len() - 2];
    match objects.get(below) {
        Some(info) if info.form == Form::Box => format!(" inside the {}", info.description()),
        Some(info) => format!(" on top the {}", info.description()),
        None => String::new(),
    }
}

fn is_goal(goal: &Dnf, node: &Node, objects: &HashMap<String, ObjectInfo>) -> bool {
    goal.0
        .iter()
        .any(|conjunction| conjunction.iter().all(|literal| literal_holds(literal, node, objects)))
}

/// `holding(x)` holds iff the arm holds `x`; a binary literal holds iff its
/// subject sits in a stack and the shared dispatch table confirms the
/// relation from the subject's actual position.
fn literal_holds(literal: &Literal, node: &Node, objects: &HashMap<String, ObjectInfo>) -> bool {
    let truth = match literal.relation {
        Relation::Holding => literal.args.first().map(String::as_str) == node.holding.as_deref(),
        relation => match literal.args.as_slice() {
            [a, b] => match located(&node.stacks, a) {
                Some((col, pos)) => physics::relation_holds(
                    &node.stacks,
                    objects,
                    relation,
                    std::slice::from_ref(b),
                    col,
                    pos,
                ),
                None => false,
            },
            _ => false,
        },
    };
    truth == literal.polarity
}

fn located(stacks: &[Vec<String>], id: &str) -> Option<(usize, i32)> {
    let col = physics::column_of(stacks, id)?;
    let pos = physics::height_of(stacks, id, col)?;
    Some((col, pos as i32))
}

/// Admissible remaining-cost estimate: minimum over conjunctions of the last
/// literal's per-relation estimate, 0 as soon as any literal already holds.
/// Every per-literal estimate under-counts the picks, moves and drops still
/// needed, so the combination never over-estimates.
fn estimate(goal: &Dnf, node: &Node, objects: &HashMap<String, ObjectInfo>) -> i32 {
    let mut best = i32::MAX;
    for conjunction in &goal.0 {
        let mut last = 0;
        for literal in conjunction {
            if literal_holds(literal, node, objects) {
                return 0;
            }
            last = estimate_literal(literal, node);
        }
        best = best.min(last);
    }
    if best == i32::MAX {
        0
    } else {
        best
    }
}

fn estimate_literal(literal: &Literal, node: &Node) -> i32 {
    if !literal.polarity {
        return 0;
    }
    let column = |i: usize| {
        literal.args.get(i).and_then(|id| physics::column_of(&node.stacks, id))
    };
    let above =
        |i: usize| literal.args.get(i).map_or(0, |id| physics::above_count(&node.stacks, id) as i32);
    let reach = |i: usize| column(i).map_or(0, |col| (node.arm as i32 - col as i32).abs());
    let span = match (column(0), column(1)) {
        (Some(a), Some(b)) => (a as i32 - b as i32).abs(),
        _ => 0,
    };
    match literal.relation {
        Relation::Holding => 4 * above(0) + reach(0),
        Relation::Inside | Relation::OnTop => 3 * (above(0) + above(1)) + reach(0) + reach(1),
        Relation::Under => 4 * above(1) + span + reach(1),
        Relation::Above => 4 * above(0) + span + reach(0),
        Relation::LeftOf | Relation::RightOf => 4 * above(0) + span + reach(0),
        Relation::Beside => (4 * above(0) + span + reach(0) - 1).max(0),
    }
}
