//! The implicit state graph searched by the planner: nodes are world
//! snapshots, edges the four primitive arm actions.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::parse::Relation;
use crate::physics::is_valid_goal;
use crate::search::Graph;
use crate::world::{ObjectInfo, WorldState, FLOOR};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Pick,
    Drop,
    Left,
    Right,
}

impl Action {
    /// One-letter code consumed by the world runtime.
    pub fn code(&self) -> &'static str {
        match self {
            Action::Pick => "p",
            Action::Drop => "d",
            Action::Left => "l",
            Action::Right => "r",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A search node. `last_action` records how the node was reached and is used
/// only for plan reconstruction; identity and hashing cover exactly
/// `(arm, holding, stacks)`.
#[derive(Clone, Debug)]
pub struct Node {
    pub arm: usize,
    pub holding: Option<String>,
    pub stacks: Vec<Vec<String>>,
    pub last_action: Option<Action>,
}

impl Node {
    pub fn from_world(world: &WorldState) -> Self {
        Self {
            arm: world.arm,
            holding: world.holding.clone(),
            stacks: world.stacks.clone(),
            last_action: None,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.arm == other.arm && self.holding == other.holding && self.stacks == other.stacks
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.arm.hash(state);
        self.holding.hash(state);
        self.stacks.hash(state);
    }
}

/// Successor relation over `Node`, parameterized by the attribute table that
/// decides which drops are physically legal.
pub struct StateGraph<'a> {
    objects: &'a HashMap<String, ObjectInfo>,
}

impl<'a> StateGraph<'a> {
    pub fn new(objects: &'a HashMap<String, ObjectInfo>) -> Self {
        Self { objects }
    }
}

impl Graph for StateGraph<'_> {
    type Node = Node;

    // Uniform cost 1. Generation order pick, right, left, drop is fixed and
    // observable. Successor stacks are fresh copies; the parent is never
    // touched.
    fn successors(&self, node: &Node) -> Vec<(Node, i32)> {
        let mut out = Vec::with_capacity(4);
        if node.holding.is_none() && !node.stacks[node.arm].is_empty() {
            let mut stacks = node.stacks.clone();
            let id = stacks[node.arm].pop();
            out.push((
                Node { arm: node.arm, holding: id, stacks, last_action: Some(Action::Pick) },
                1,
            ));
        }
        if node.arm + 1 < node.stacks.len() {
            out.push((
                Node {
                    arm: node.arm + 1,
                    holding: node.holding.clone(),
                    stacks: node.stacks.clone(),
                    last_action: Some(Action::Right),
                },
                1,
            ));
        }
        if node.arm > 0 {
            out.push((
                Node {
                    arm: node.arm - 1,
                    holding: node.holding.clone(),
                    stacks: node.stacks.clone(),
                    last_action: Some(Action::Left),
                },
                1,
            ));
        }
        if let Some(held) = &node.holding {
            let top = node.stacks[node.arm].last().map_or(FLOOR, String::as_str);
            if is_valid_goal(self.objects, Relation::Inside, held, top)
                || is_valid_goal(self.objects, Relation::OnTop, held, top)
            {
                let mut stacks = node.stacks.clone();
                stacks[node.arm].push(held.clone());
                out.push((
                    Node { arm: node.arm, holding: None, stacks, last_action: Some(Action::Drop) },
                    1,
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Form, Size};

    fn objects() -> HashMap<String, ObjectInfo> {
        let mut objects = HashMap::new();
        objects.insert("a".to_owned(), ObjectInfo::new(Form::Ball, Size::Small, "white"));
        objects.insert("b".to_owned(), ObjectInfo::new(Form::Box, Size::Large, "red"));
        objects
    }

    fn node(arm: usize, holding: Option<&str>, stacks: &[&[&str]]) -> Node {
        Node {
            arm,
            holding: holding.map(str::to_owned),
            stacks: stacks.iter().map(|s| s.iter().map(|x| x.to_string()).collect()).collect(),
            last_action: None,
        }
    }

    #[test]
    fn identity_ignores_the_last_action() {
        let mut a = node(0, None, &[&["a"]]);
        let b = node(0, None, &[&["a"]]);
        a.last_action = Some(Action::Left);
        assert_eq!(a, b);
    }

    #[test]
    fn successors_follow_the_fixed_order() {
        let objects = objects();
        let graph = StateGraph::new(&objects);
        let start = node(1, Some("a"), &[&[], &[], &["b"]]);
        let actions: Vec<_> = graph
            .successors(&start)
            .into_iter()
            .map(|(n, _)| n.last_action)
            .collect();
        assert_eq!(
            actions,
            vec![Some(Action::Right), Some(Action::Left), Some(Action::Drop)]
        );
    }

    #[test]
    fn pick_takes_the_top_and_shortens_the_column() {
        let objects = objects();
        let graph = StateGraph::new(&objects);
        let start = node(0, None, &[&["b", "a"]]);
        let successors = graph.successors(&start);
        let (picked, cost) = &successors[0];
        assert_eq!(*cost, 1);
        assert_eq!(picked.last_action, Some(Action::Pick));
        assert_eq!(picked.holding.as_deref(), Some("a"));
        assert_eq!(picked.stacks, vec![vec!["b".to_owned()]]);
        // parent untouched
        assert_eq!(start.stacks, vec![vec!["b".to_owned(), "a".to_owned()]]);
        assert_eq!(start.holding, None);
    }

    #[test]
    fn drop_respects_the_physical_laws() {
        let objects = objects();
        let graph = StateGraph::new(&objects);
        // a ball goes inside a box
        let onto_box = node(0, Some("a"), &[&["b"]]);
        assert!(graph
            .successors(&onto_box)
            .iter()
            .any(|(n, _)| n.last_action == Some(Action::Drop)));
        // a box may not be dropped onto a held-out ball column
        let onto_ball = node(0, Some("b"), &[&["a"]]);
        assert!(!graph
            .successors(&onto_ball)
            .iter()
            .any(|(n, _)| n.last_action == Some(Action::Drop)));
    }

    #[test]
    fn single_column_worlds_never_move_the_arm() {
        let objects = objects();
        let graph = StateGraph::new(&objects);
        let start = node(0, None, &[&["a"]]);
        let actions: Vec<_> = graph
            .successors(&start)
            .into_iter()
            .map(|(n, _)| n.last_action)
            .collect();
        assert_eq!(actions, vec![Some(Action::Pick)]);
    }

    #[test]
    fn empty_hand_over_an_empty_column_neither_picks_nor_drops() {
        let objects = objects();
        let graph = StateGraph::new(&objects);
        let start = node(0, None, &[&[], &["a"]]);
        let actions: Vec<_> = graph
            .successors(&start)
            .into_iter()
            .map(|(n, _)| n.last_action)
            .collect();
        assert_eq!(actions, vec![Some(Action::Right)]);
    }
}
