//! Conversions from recipes and index groups into template [`Value`]s.

use crate::index::Group;
use crate::recipe::{page_file_name, Recipe};
use gtmpl::Value;
use std::collections::HashMap;

/// Builds a [`Value::Object`] from `(key, value)` pairs.
fn object<I: IntoIterator<Item = (&'static str, Value)>>(pairs: I) -> Value {
    let m: HashMap<String, Value> = pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();
    Value::Object(m)
}

fn string(s: impl Into<String>) -> Value {
    Value::String(s.into())
}

/// A `{name, url}` object linking to an anchor on an aggregate page, e.g.
/// `../index.html#dinner`.
fn anchor_link(name: &str, page: &str) -> Value {
    object(vec![
        ("name", string(name)),
        ("url", string(format!("{}#{}", page, name.to_lowercase()))),
    ])
}

/// A `{title, url}` object linking to a recipe page. `prefix` is the path
/// from the linking page to the recipe pages' directory, e.g. `./` or
/// `./recipes/`.
pub fn recipe_link(title: &str, prefix: &str) -> Value {
    object(vec![
        ("title", string(title)),
        ("url", string(format!("{}{}", prefix, page_file_name(title)))),
    ])
}

/// Converts a [`Recipe`] into the value handed to the recipe page template.
/// `table` is the recipe's rendered step table.
pub fn recipe_value(recipe: &Recipe, table: String) -> Value {
    let sections = recipe
        .sections
        .iter()
        .map(|(name, body)| {
            object(vec![
                ("name", string(crate::util::title_case(name))),
                ("body", string(body.as_str())),
            ])
        })
        .collect();

    let flavors = recipe.flavors.as_deref().unwrap_or(&[]);

    object(vec![
        ("title", string(recipe.title.as_str())),
        ("servings", string(recipe.servings.as_str())),
        ("table", string(table)),
        ("sections", Value::Array(sections)),
        (
            "tags",
            Value::Array(
                recipe
                    .tags
                    .iter()
                    .map(|t| anchor_link(t, "../index.html"))
                    .collect(),
            ),
        ),
        ("has_flavors", Value::Bool(recipe.flavors.is_some())),
        (
            "flavors",
            Value::Array(
                flavors
                    .iter()
                    .map(|f| anchor_link(f, "../flavor.html"))
                    .collect(),
            ),
        ),
        (
            "used_in",
            Value::Array(
                recipe
                    .used_in
                    .iter()
                    .map(|title| recipe_link(title, "./"))
                    .collect(),
            ),
        ),
    ])
}

/// Converts the groups of an aggregate page into the value handed to the
/// index template. `recipes_prefix` is the path from the aggregate page to
/// the recipe pages.
pub fn index_value(title: &str, groups: &[Group], recipes_prefix: &str) -> Value {
    object(vec![
        ("title", string(title)),
        (
            "groups",
            Value::Array(
                groups
                    .iter()
                    .map(|g| {
                        object(vec![
                            ("name", string(g.name.as_str())),
                            ("id", string(g.id())),
                            (
                                "recipes",
                                Value::Array(
                                    g.recipes
                                        .iter()
                                        .map(|r| recipe_link(&r.title, recipes_prefix))
                                        .collect(),
                                ),
                            ),
                        ])
                    })
                    .collect(),
            ),
        ),
    ])
}
