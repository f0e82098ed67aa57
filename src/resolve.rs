//! Resolves the references made in recipe steps and records "used in"
//! backlinks on the referenced recipes.

use crate::recipe::Recipe;

/// For every reference in every recipe's leaf steps, appends the referencing
/// recipe's title to the `used_in` list of every other recipe whose title is
/// exactly the reference. Each occurrence is recorded, so a recipe
/// referencing the same title from two steps appears twice. References that
/// match no title are dropped. Returns the number of backlinks recorded.
pub fn resolve(recipes: &mut [Recipe]) -> usize {
    let references: Vec<(usize, String)> = recipes
        .iter()
        .enumerate()
        .flat_map(|(i, recipe)| {
            recipe
                .leaf_references()
                .map(move |reference| (i, reference.to_owned()))
                .collect::<Vec<_>>()
        })
        .collect();

    let mut recorded = 0;
    for (source, reference) in references {
        let mut matched = false;
        for target in 0..recipes.len() {
            if target == source || recipes[target].title != reference {
                continue;
            }
            let title = recipes[source].title.clone();
            recipes[target].used_in.push(title);
            matched = true;
            recorded += 1;
        }
        if !matched {
            log::debug!(
                "unresolved reference `{}` in `{}`",
                reference,
                recipes[source].title
            );
        }
    }
    recorded
}
