//! Resolves parse trees against a world into DNF goal formulas.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dnf::{Conjunction, Dnf, Literal};
use crate::error::Error;
use crate::parse::{Command, Location, Object, ParseResult, Relation};
use crate::physics;
use crate::world::{Form, WorldState, FLOOR};

/// A successfully interpreted parse: the command it came from and the goal
/// formula it denotes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub command: Command,
    pub goal: Dnf,
}

/// Interprets every candidate parse against `world`. Failures of individual
/// parses are suppressed as long as any parse succeeds; otherwise the first
/// captured error is returned.
pub fn interpret(parses: &[ParseResult], world: &WorldState) -> Result<Vec<Interpretation>, Error> {
    world.validate()?;
    debug!(parses = parses.len(), "interpreting candidate parses");
    let mut interpretations = Vec::new();
    let mut first_error = None;
    for parse in parses {
        match interpret_command(&parse.command, world) {
            Ok(goal) => {
                trace!(%goal, "parse interpreted");
                interpretations.push(Interpretation { command: parse.command.clone(), goal });
            }
            Err(error) => {
                trace!(%error, "parse rejected");
                first_error.get_or_insert(error);
            }
        }
    }
    if interpretations.is_empty() {
        Err(first_error.unwrap_or(Error::NoInterpretation))
    } else {
        Ok(interpretations)
    }
}

/// Goal literals for one command. Disjuncts are emitted in Cartesian product
/// order, subject set outer and target set inner; physically impossible
/// combinations are filtered, and a command whose combinations all filter
/// away has no interpretation.
fn interpret_command(command: &Command, world: &WorldState) -> Result<Dnf, Error> {
    let mut conjunctions: Vec<Conjunction> = Vec::new();
    match command {
        Command::Take { entity } => {
            for id in resolve_entity(&entity.object, world)? {
                if id != FLOOR {
                    conjunctions.push(vec![Literal::holding(&id)]);
                }
            }
        }
        Command::Move { entity, location } => {
            let subjects = resolve_entity(&entity.object, world)?;
            let targets = resolve_location(location, world)?;
            for a in &subjects {
                for b in &targets {
                    if physics::is_valid_goal(&world.objects, location.relation, a, b) {
                        conjunctions.push(vec![Literal::binary(location.relation, a, b)]);
                    }
                }
            }
        }
        Command::Put { location } => {
            let held = world
                .holding
                .clone()
                .ok_or_else(|| Error::IllegalReference("the arm is not holding anything".to_owned()))?;
            for b in resolve_location(location, world)? {
                if physics::is_valid_goal(&world.objects, location.relation, &held, &b) {
                    conjunctions.push(vec![Literal::binary(location.relation, &held, &b)]);
                }
            }
        }
    }
    if conjunctions.is_empty() {
        Err(Error::NoInterpretation)
    } else {
        Ok(Dnf(conjunctions))
    }
}

fn resolve_location(location: &Location, world: &WorldState) -> Result<Vec<String>, Error> {
    if location.relation == Relation::Holding {
        return Err(Error::IllegalReference("`holding` cannot describe a location".to_owned()));
    }
    resolve_entity(&location.entity.object, world)
}

/// The set of object ids matching an object reference, in world scan order:
/// columns left to right, positions bottom to top. Held objects are not in
/// any stack and are therefore never matched by attribute.
pub fn resolve_entity(object: &Object, world: &WorldState) -> Result<Vec<String>, Error> {
    match object {
        Object::Simple(description) if description.form == Form::Floor => Ok(vec![FLOOR.to_owned()]),
        Object::Simple(description) => {
            let mut matches = Vec::new();
            for stack in &world.stacks {
                for id in stack {
                    if world.objects.get(id).map_or(false, |info| description.matches(info)) {
                        matches.push(id.clone());
                    }
                }
            }
            Ok(matches)
        }
        Object::Relative { object: inner, location } => {
            let candidates = resolve_entity(inner, world)?;
            if candidates.iter().any(|id| id == FLOOR) {
                return Err(Error::IllegalReference(
                    "the floor cannot be qualified by a location".to_owned(),
                ));
            }
            let relatives = resolve_location(location, world)?;
            let mut kept = Vec::new();
            for candidate in candidates {
                let col = match physics::column_of(&world.stacks, &candidate) {
                    Some(col) => col,
                    None => continue,
                };
                let pos = match physics::height_of(&world.stacks, &candidate, col) {
                    Some(pos) => pos as i32,
                    None => continue,
                };
                if physics::relation_holds(
                    &world.stacks,
                    &world.objects,
                    location.relation,
                    &relatives,
                    col,
                    pos,
                ) {
                    kept.push(candidate);
                }
            }
            Ok(kept)
        }
    }
}
