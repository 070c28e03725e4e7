use std::collections::{HashMap, HashSet};
use std::fmt;

use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::parse::Relation;
use crate::physics;

/// Reserved id for the floor. It is not a real object and never appears in
/// `WorldState::objects` or inside a stack.
pub const FLOOR: &str = "floor";

#[derive(EnumSetType, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Form {
    Brick,
    Plank,
    Ball,
    Box,
    Pyramid,
    Table,
    Floor,
    AnyForm,
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Form::Brick => write!(f, "brick"),
            Form::Plank => write!(f, "plank"),
            Form::Ball => write!(f, "ball"),
            Form::Box => write!(f, "box"),
            Form::Pyramid => write!(f, "pyramid"),
            Form::Table => write!(f, "table"),
            Form::Floor => write!(f, "floor"),
            Form::AnyForm => write!(f, "anyform"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    Large,
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Size::Small => write!(f, "small"),
            Size::Large => write!(f, "large"),
        }
    }
}

/// Attributes of one object in the world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub form: Form,
    pub size: Size,
    #[serde(default)]
    pub color: Option<String>,
}

impl ObjectInfo {
    pub fn new(form: Form, size: Size, color: &str) -> Self {
        Self { form, size, color: Some(color.to_owned()) }
    }

    /// Phrase used in plan utterances, e.g. "small white ball".
    pub fn description(&self) -> String {
        match &self.color {
            Some(color) => format!("{} {} {}", self.size, color, self.form),
            None => format!("{} {}", self.size, self.form),
        }
    }
}

/// Snapshot of the blocks world: gripper column, grasped object, stack
/// contents and the attribute table. Inputs to the interpreter and planner
/// are borrowed and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub arm: usize,
    #[serde(default)]
    pub holding: Option<String>,
    pub stacks: Vec<Vec<String>>,
    pub objects: HashMap<String, ObjectInfo>,
}

impl WorldState {
    /// Checks the structural invariants of a world before any reasoning is
    /// done over it: the arm is in range, every stacked id is a known object
    /// appearing exactly once and not also held, no real object uses the
    /// reserved floor id or a descriptive form, and every adjacent stack
    /// pair is a physically legal support.
    pub fn validate(&self) -> Result<(), Error> {
        if self.arm >= self.stacks.len() {
            return Err(Error::InvalidWorld(format!(
                "arm column {} is out of range for {} columns",
                self.arm,
                self.stacks.len()
            )));
        }
        if self.objects.contains_key(FLOOR) {
            return Err(Error::InvalidWorld(format!("the id `{}` is reserved", FLOOR)));
        }
        for (id, info) in &self.objects {
            if DESCRIPTIVE_FORMS.contains(info.form) {
                return Err(Error::InvalidWorld(format!(
                    "object `{}` has descriptive form `{}`",
                    id, info.form
                )));
            }
        }
        let mut seen = HashSet::new();
        for stack in &self.stacks {
            for id in stack {
                if id == FLOOR {
                    return Err(Error::InvalidWorld(format!("the id `{}` is reserved", FLOOR)));
                }
                if !self.objects.contains_key(id) {
                    return Err(Error::InvalidWorld(format!("stacked id `{}` has no attributes", id)));
                }
                if self.holding.as_deref() == Some(id.as_str()) {
                    return Err(Error::InvalidWorld(format!("`{}` is both stacked and held", id)));
                }
                if !seen.insert(id.as_str()) {
                    return Err(Error::InvalidWorld(format!("`{}` appears in more than one position", id)));
                }
            }
        }
        if let Some(held) = &self.holding {
            if !self.objects.contains_key(held) {
                return Err(Error::InvalidWorld(format!("held id `{}` has no attributes", held)));
            }
        }
        for stack in &self.stacks {
            for pair in stack.windows(2) {
                let (below, above) = (&pair[0], &pair[1]);
                if !physics::is_valid_goal(&self.objects, Relation::Inside, above, below)
                    && !physics::is_valid_goal(&self.objects, Relation::OnTop, above, below)
                {
                    return Err(Error::InvalidWorld(format!(
                        "`{}` cannot rest on `{}`",
                        above, below
                    )));
                }
            }
        }
        Ok(())
    }
}

const DESCRIPTIVE_FORMS: EnumSet<Form> = enumset::enum_set!(Form::Floor | Form::AnyForm);
