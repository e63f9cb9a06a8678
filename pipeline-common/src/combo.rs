//! Random combination picker
//!
//! Proposes a character, an output type and one ingredient for each category
//! that output type requires. Any part can be locked: a locked character or
//! output type is used as-is, and a locked ingredient wins its category.
//!
//! Randomness comes from a [`Chooser`] so tests can drive the picks.

use crate::db::{characters, ingredients, output_types};
use crate::models::{Character, DbId, Ingredient, IngredientCategory, OutputType};
use crate::Result;
use rand::Rng;
use serde::Serialize;
use sqlx::SqlitePool;

/// Source of uniform picks
pub trait Chooser {
    /// Return an index in `0..len`; `len` is never zero
    fn choose(&mut self, len: usize) -> usize;
}

/// Chooser backed by the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngChooser;

impl Chooser for ThreadRngChooser {
    fn choose(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

impl<F> Chooser for F
where
    F: FnMut(usize) -> usize,
{
    fn choose(&mut self, len: usize) -> usize {
        self(len)
    }
}

/// What the caller wants held fixed
#[derive(Debug, Clone, Default)]
pub struct ComboLocks {
    pub character_id: Option<DbId>,
    pub output_type_id: Option<DbId>,
    pub ingredient_ids: Vec<DbId>,
}

/// One required category and the ingredient picked for it
#[derive(Debug, Clone, Serialize)]
pub struct CategoryPick {
    pub category: IngredientCategory,
    pub ingredient: Option<Ingredient>,
}

/// A proposed combination
#[derive(Debug, Clone, Serialize)]
pub struct Combo {
    pub character: Option<Character>,
    pub output_type: Option<OutputType>,
    pub ingredients: Vec<CategoryPick>,
}

fn pick<T: Clone>(items: &[T], chooser: &mut impl Chooser) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let index = chooser.choose(items.len()).min(items.len() - 1);
    items.get(index).cloned()
}

/// Propose a combination
///
/// - character: the locked id if given (even if retired; unknown id gives
///   none), otherwise a uniform pick among non-retired characters
/// - output type: the locked id if given, otherwise a uniform pick
/// - ingredients: for each category the output type requires, in category
///   name order, the lowest-id locked ingredient in that category, otherwise
///   a uniform pick; an empty category yields no ingredient
pub async fn pick_combo(
    pool: &SqlitePool,
    locks: &ComboLocks,
    chooser: &mut impl Chooser,
) -> Result<Combo> {
    let character = match locks.character_id {
        Some(id) => characters::get_character(pool, id).await?,
        None => pick(&characters::list_eligible_characters(pool).await?, chooser),
    };

    let output_type = match locks.output_type_id {
        Some(id) => output_types::get_output_type(pool, id).await?,
        None => pick(&output_types::list_output_types(pool).await?, chooser),
    };

    let mut picks = Vec::new();
    if let Some(output_type) = &output_type {
        for category in output_types::required_categories(pool, output_type.id).await? {
            let candidates = ingredients::ingredients_in_category(pool, category.id).await?;
            let locked = candidates
                .iter()
                .filter(|i| locks.ingredient_ids.contains(&i.id))
                .min_by_key(|i| i.id)
                .cloned();
            let ingredient = match locked {
                Some(ingredient) => Some(ingredient),
                None => pick(&candidates, chooser),
            };
            picks.push(CategoryPick {
                category,
                ingredient,
            });
        }
    }

    Ok(Combo {
        character,
        output_type,
        ingredients: picks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_empty_slice() {
        let mut first = |_len: usize| 0;
        let empty: [i32; 0] = [];
        assert_eq!(pick(&empty, &mut first), None);
    }

    #[test]
    fn test_pick_clamps_out_of_range_index() {
        let mut wild = |len: usize| len + 10;
        assert_eq!(pick(&[1, 2, 3], &mut wild), Some(3));
    }

    #[test]
    fn test_thread_rng_stays_in_range() {
        let mut chooser = ThreadRngChooser;
        for _ in 0..100 {
            assert!(chooser.choose(3) < 3);
        }
    }
}
