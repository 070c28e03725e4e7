//! Physical laws of the blocks world: pure predicates over `(stacks,
//! objects)` shared by the interpreter (to prune goal literals) and the
//! planner (to prune successors and test goals).

use std::collections::HashMap;

use enumset::{enum_set, EnumSet};

use crate::parse::Relation;
use crate::world::{Form, ObjectInfo, Size, FLOOR};

pub fn column_of(stacks: &[Vec<String>], id: &str) -> Option<usize> {
    stacks.iter().position(|stack| stack.iter().any(|x| x == id))
}

pub fn height_of(stacks: &[Vec<String>], id: &str, col: usize) -> Option<usize> {
    stacks.get(col).and_then(|stack| stack.iter().position(|x| x == id))
}

pub fn above_count(stacks: &[Vec<String>], id: &str) -> usize {
    match column_of(stacks, id) {
        Some(col) => match height_of(stacks, id, col) {
            Some(pos) => stacks[col].len() - 1 - pos,
            None => 0,
        },
        None => 0,
    }
}

pub fn is_left_of(stacks: &[Vec<String>], targets: &[String], col: usize) -> bool {
    targets.iter().any(|t| matches!(column_of(stacks, t), Some(c) if c > col))
}

pub fn is_right_of(stacks: &[Vec<String>], targets: &[String], col: usize) -> bool {
    targets.iter().any(|t| matches!(column_of(stacks, t), Some(c) if c < col))
}

pub fn is_beside(stacks: &[Vec<String>], targets: &[String], col: usize) -> bool {
    targets
        .iter()
        .any(|t| matches!(column_of(stacks, t), Some(c) if c + 1 == col || c == col + 1))
}

pub fn is_on_top(stacks: &[Vec<String>], targets: &[String], col: usize, pos: i32) -> bool {
    targets.iter().any(|t| {
        if t == FLOOR {
            pos < 0
        } else {
            pos >= 0
                && column_of(stacks, t) == Some(col)
                && height_of(stacks, t, col) == Some(pos as usize)
        }
    })
}

pub fn is_inside(
    stacks: &[Vec<String>],
    objects: &HashMap<String, ObjectInfo>,
    targets: &[String],
    col: usize,
    pos: i32,
) -> bool {
    targets.iter().any(|t| {
        t != FLOOR
            && objects.get(t).map_or(false, |info| info.form == Form::Box)
            && pos >= 0
            && column_of(stacks, t) == Some(col)
            && height_of(stacks, t, col) == Some(pos as usize)
    })
}

pub fn is_above(stacks: &[Vec<String>], targets: &[String], col: usize, pos: i32) -> bool {
    targets.iter().any(|t| {
        t == FLOOR
            || (column_of(stacks, t) == Some(col)
                && height_of(stacks, t, col).map_or(false, |h| (h as i32) < pos))
    })
}

pub fn is_under(stacks: &[Vec<String>], targets: &[String], col: usize, pos: i32) -> bool {
    targets.iter().any(|t| {
        t != FLOOR
            && column_of(stacks, t) == Some(col)
            && height_of(stacks, t, col).map_or(false, |h| (h as i32) >= pos)
    })
}

/// Tests whether a subject anchored at `(col, pos)` stands in `relation` to
/// any of `targets`. This is the single dispatch table used both when
/// filtering relative-clause candidates and when evaluating goal literals;
/// the position offsets encode that `ontop`/`inside` look at the slot
/// directly below the subject and `under` at the slots strictly above it.
pub fn relation_holds(
    stacks: &[Vec<String>],
    objects: &HashMap<String, ObjectInfo>,
    relation: Relation,
    targets: &[String],
    col: usize,
    pos: i32,
) -> bool {
    match relation {
        Relation::LeftOf => is_left_of(stacks, targets, col),
        Relation::RightOf => is_right_of(stacks, targets, col),
        Relation::Beside => is_beside(stacks, targets, col),
        Relation::Inside => is_inside(stacks, objects, targets, col, pos - 1),
        Relation::OnTop => is_on_top(stacks, targets, col, pos - 1),
        Relation::Above => is_above(stacks, targets, col, pos),
        Relation::Under => is_under(stacks, targets, col, pos + 1),
        Relation::Holding => false,
    }
}

// Boxes cannot contain pyramids, planks or boxes of their own size.
const FILLS_BOX: EnumSet<Form> = enum_set!(Form::Pyramid | Form::Plank | Form::Box);
// Small boxes cannot rest on these small forms.
const WEAK_SUPPORT: EnumSet<Form> = enum_set!(Form::Brick | Form::Pyramid);

/// Whether the literal `relation(a, b)` can physically hold in any reachable
/// world. Used to prune goal literals at interpretation time and drop
/// actions at search time.
pub fn is_valid_goal(
    objects: &HashMap<String, ObjectInfo>,
    relation: Relation,
    a: &str,
    b: &str,
) -> bool {
    if a == b || a == FLOOR {
        return false;
    }
    if b == FLOOR {
        return matches!(relation, Relation::OnTop | Relation::Above);
    }
    let (a, b) = match (objects.get(a), objects.get(b)) {
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };
    match relation {
        Relation::Inside => {
            b.form == Form::Box
                && !(a.size == Size::Large && b.size == Size::Small)
                && !(FILLS_BOX.contains(a.form) && a.size == b.size)
        }
        Relation::OnTop | Relation::Above => {
            !(relation == Relation::OnTop && a.form == Form::Ball)
                && b.form != Form::Ball
                && !(a.size == Size::Large && b.size == Size::Small)
                && !(a.form == Form::Box
                    && a.size == Size::Small
                    && b.size == Size::Small
                    && WEAK_SUPPORT.contains(b.form))
                && !(a.form == Form::Box
                    && a.size == Size::Large
                    && b.form == Form::Pyramid
                    && b.size == Size::Large)
                && !(relation == Relation::OnTop && b.form == Form::Box)
        }
        Relation::Holding => false,
        Relation::LeftOf | Relation::RightOf | Relation::Beside | Relation::Under => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> (Vec<Vec<String>>, HashMap<String, ObjectInfo>) {
        let stacks = vec![
            vec!["e".to_owned(), "a".to_owned()],
            vec![],
            vec!["b".to_owned()],
        ];
        let mut objects = HashMap::new();
        objects.insert("a".to_owned(), ObjectInfo::new(Form::Ball, Size::Small, "white"));
        objects.insert("b".to_owned(), ObjectInfo::new(Form::Box, Size::Large, "red"));
        objects.insert("e".to_owned(), ObjectInfo::new(Form::Box, Size::Large, "green"));
        (stacks, objects)
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn positions() {
        let (stacks, _) = world();
        assert_eq!(column_of(&stacks, "a"), Some(0));
        assert_eq!(column_of(&stacks, "b"), Some(2));
        assert_eq!(column_of(&stacks, "missing"), None);
        assert_eq!(height_of(&stacks, "a", 0), Some(1));
        assert_eq!(height_of(&stacks, "a", 2), None);
        assert_eq!(above_count(&stacks, "e"), 1);
        assert_eq!(above_count(&stacks, "a"), 0);
        assert_eq!(above_count(&stacks, "missing"), 0);
    }

    #[test]
    fn lateral_relations() {
        let (stacks, _) = world();
        assert!(is_left_of(&stacks, &ids(&["b"]), 0));
        assert!(!is_left_of(&stacks, &ids(&["a"]), 2));
        assert!(is_right_of(&stacks, &ids(&["a"]), 2));
        assert!(is_beside(&stacks, &ids(&["a"]), 1));
        assert!(!is_beside(&stacks, &ids(&["a"]), 2));
        // the floor has no column
        assert!(!is_left_of(&stacks, &ids(&[FLOOR]), 0));
        assert!(!is_beside(&stacks, &ids(&[FLOOR]), 1));
    }

    #[test]
    fn vertical_relations() {
        let (stacks, objects) = world();
        // a sits at (0, 1) on top of e
        assert!(is_on_top(&stacks, &ids(&["e"]), 0, 0));
        assert!(!is_on_top(&stacks, &ids(&["e"]), 0, 1));
        assert!(is_on_top(&stacks, &ids(&[FLOOR]), 0, -1));
        assert!(is_inside(&stacks, &objects, &ids(&["e"]), 0, 0));
        assert!(!is_inside(&stacks, &objects, &ids(&[FLOOR]), 0, -1));
        assert!(is_above(&stacks, &ids(&["e"]), 0, 1));
        assert!(!is_above(&stacks, &ids(&["a"]), 0, 1));
        assert!(is_above(&stacks, &ids(&[FLOOR]), 0, 0));
        assert!(is_under(&stacks, &ids(&["a"]), 0, 1));
        assert!(!is_under(&stacks, &ids(&["e"]), 0, 1));
        assert!(!is_under(&stacks, &ids(&[FLOOR]), 0, 0));
    }

    #[test]
    fn goal_validity_floor_and_self() {
        let (_, objects) = world();
        assert!(!is_valid_goal(&objects, Relation::OnTop, "a", "a"));
        assert!(!is_valid_goal(&objects, Relation::OnTop, FLOOR, "a"));
        assert!(is_valid_goal(&objects, Relation::OnTop, "a", FLOOR));
        assert!(is_valid_goal(&objects, Relation::Above, "a", FLOOR));
        assert!(!is_valid_goal(&objects, Relation::Inside, "a", FLOOR));
        assert!(!is_valid_goal(&objects, Relation::Under, "a", FLOOR));
    }

    #[test]
    fn goal_validity_size_and_form_rules() {
        let mut objects = HashMap::new();
        objects.insert("bigbox".to_owned(), ObjectInfo::new(Form::Box, Size::Large, "red"));
        objects.insert("smallbox".to_owned(), ObjectInfo::new(Form::Box, Size::Small, "blue"));
        objects.insert("brick".to_owned(), ObjectInfo::new(Form::Brick, Size::Small, "grey"));
        objects.insert("bigbrick".to_owned(), ObjectInfo::new(Form::Brick, Size::Large, "grey"));
        objects.insert("ball".to_owned(), ObjectInfo::new(Form::Ball, Size::Small, "white"));
        objects.insert("pyramid".to_owned(), ObjectInfo::new(Form::Pyramid, Size::Large, "green"));
        objects.insert("plank".to_owned(), ObjectInfo::new(Form::Plank, Size::Large, "black"));

        // balls go inside boxes or on the floor, never on top of things
        assert!(!is_valid_goal(&objects, Relation::OnTop, "ball", "brick"));
        assert!(is_valid_goal(&objects, Relation::Inside, "ball", "smallbox"));
        // nothing rests on a ball
        assert!(!is_valid_goal(&objects, Relation::OnTop, "brick", "ball"));
        assert!(!is_valid_goal(&objects, Relation::Above, "brick", "ball"));
        // large never on small
        assert!(!is_valid_goal(&objects, Relation::OnTop, "bigbrick", "brick"));
        assert!(!is_valid_goal(&objects, Relation::Inside, "bigbox", "smallbox"));
        // boxes receive objects via inside, not ontop
        assert!(!is_valid_goal(&objects, Relation::OnTop, "brick", "bigbox"));
        assert!(is_valid_goal(&objects, Relation::Above, "brick", "bigbox"));
        assert!(is_valid_goal(&objects, Relation::Inside, "brick", "bigbox"));
        // boxes cannot contain same-size pyramids, planks or boxes
        assert!(!is_valid_goal(&objects, Relation::Inside, "pyramid", "bigbox"));
        assert!(!is_valid_goal(&objects, Relation::Inside, "plank", "bigbox"));
        assert!(is_valid_goal(&objects, Relation::Inside, "smallbox", "bigbox"));
        // small boxes need solid small support
        assert!(!is_valid_goal(&objects, Relation::OnTop, "smallbox", "brick"));
        // large boxes cannot sit on large pyramids
        assert!(!is_valid_goal(&objects, Relation::OnTop, "bigbox", "pyramid"));
        assert!(is_valid_goal(&objects, Relation::OnTop, "smallbox", "plank"));
        // lateral goals have no form constraints
        assert!(is_valid_goal(&objects, Relation::Beside, "ball", "pyramid"));
        assert!(is_valid_goal(&objects, Relation::LeftOf, "plank", "brick"));
        assert!(is_valid_goal(&objects, Relation::Under, "brick", "bigbrick"));
    }
}
