//! Groups [`Recipe`]s by tag and by flavor for the aggregate index pages.

use crate::recipe::Recipe;
use std::collections::BTreeMap;

/// A named collection of recipes, rendered as one section of an index page.
pub struct Group<'a> {
    /// The tag or flavor name, as written (title-cased) in the recipes.
    pub name: String,

    /// The recipes in the group, in recipe order.
    pub recipes: Vec<&'a Recipe>,
}

impl Group<'_> {
    /// The anchor id of the group's heading.
    pub fn id(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Groups recipes by each name `names` yields for them. Groups are sorted by
/// name. A recipe naming the same group twice is listed once.
pub fn group_by<'a, F>(recipes: &'a [Recipe], names: F) -> Vec<Group<'a>>
where
    F: Fn(&'a Recipe) -> &'a [String],
{
    let mut groups: BTreeMap<&str, Vec<&Recipe>> = BTreeMap::new();
    for recipe in recipes {
        for name in names(recipe) {
            let members = groups.entry(name.as_str()).or_default();
            if !members.iter().any(|r| std::ptr::eq(*r, recipe)) {
                members.push(recipe);
            }
        }
    }

    groups
        .into_iter()
        .map(|(name, recipes)| Group {
            name: name.to_owned(),
            recipes,
        })
        .collect()
}

/// Groups recipes by tag.
pub fn index_tags(recipes: &[Recipe]) -> Vec<Group> {
    group_by(recipes, |r| r.tags.as_slice())
}

/// Groups recipes by flavor. Recipes without flavors are left out.
pub fn index_flavors(recipes: &[Recipe]) -> Vec<Group> {
    group_by(recipes, |r| r.flavors.as_deref().unwrap_or(&[]))
}
