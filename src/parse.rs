//! Parse trees handed over by the upstream natural-language parser. The
//! types mirror the grammar's output and are consumed read-only.

use std::fmt;

use enumset::EnumSet;
use serde::{Deserialize, Serialize};

use crate::world::{Form, ObjectInfo, Size};

/// Spatial relations the grammar can produce, plus `holding` which only ever
/// appears in goal literals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    LeftOf,
    RightOf,
    Beside,
    Inside,
    OnTop,
    Under,
    Above,
    Holding,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::LeftOf => write!(f, "leftof"),
            Relation::RightOf => write!(f, "rightof"),
            Relation::Beside => write!(f, "beside"),
            Relation::Inside => write!(f, "inside"),
            Relation::OnTop => write!(f, "ontop"),
            Relation::Under => write!(f, "under"),
            Relation::Above => write!(f, "above"),
            Relation::Holding => write!(f, "holding"),
        }
    }
}

/// Primitive description of an object: "the large white ball" becomes
/// `{form: Ball, size: Some(Large), color: Some("white")}`. Unspecified
/// fields and `anyform` match anything.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub form: Form,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub color: Option<String>,
}

impl Description {
    pub fn forms(&self) -> EnumSet<Form> {
        if self.form == Form::AnyForm {
            EnumSet::all()
        } else {
            EnumSet::only(self.form)
        }
    }

    pub fn matches(&self, info: &ObjectInfo) -> bool {
        self.forms().contains(info.form)
            && self.size.map_or(true, |size| size == info.size)
            && self.color.as_deref().map_or(true, |color| info.color.as_deref() == Some(color))
    }
}

/// An object reference: either a primitive description or a description
/// qualified by a relative clause ("the ball beside the red box"). Relative
/// clauses nest recursively.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Object {
    Relative { object: Box<Object>, location: Location },
    Simple(Description),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub object: Object,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub relation: Relation,
    pub entity: Box<Entity>,
}

/// One candidate reading of the utterance. The optionality of entity and
/// location is structural: "take" has no location and "put" refers to the
/// held object rather than naming one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Command {
    Take { entity: Entity },
    Put { location: Location },
    Move { entity: Entity, location: Location },
}

/// Output of the upstream parser for a single candidate syntax tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub command: Command,
}
