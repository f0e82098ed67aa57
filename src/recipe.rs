//! Defines the [`Recipe`], [`Loader`], and [`Error`] types. Also defines the
//! logic for loading recipe documents from the file system into memory.

use std::{
    collections::HashMap,
    fmt,
    fs::File,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::indent::parse_steps;
use crate::reference::ReferenceExtractor;
use crate::step::StepTree;
use crate::util::title_case;

/// The extension of recipe source documents.
pub const RECIPE_EXTENSION: &str = "toml";

/// A single parsed recipe.
#[derive(Clone, Debug)]
pub struct Recipe {
    /// Derived from the source file name, e.g. `chicken_stock.toml` becomes
    /// `Chicken Stock`.
    pub title: String,

    /// Free-form display text.
    pub servings: String,

    /// Trimmed, title-cased tags.
    pub tags: Vec<String>,

    /// Trimmed, title-cased flavors. `None` when the document has no
    /// `flavors` field, which is distinct from an empty list.
    pub flavors: Option<Vec<String>>,

    /// The procedure.
    pub steps: StepTree,

    /// Any other top-level fields, in document order, as `(name, body)`.
    pub sections: Vec<(String, String)>,

    /// Titles of the recipes that reference this one. Populated by
    /// [`crate::resolve::resolve`].
    pub used_in: Vec<String>,
}

impl Recipe {
    /// The maximum depth of the recipe's step forest.
    pub fn depth(&self) -> usize {
        self.steps.depth()
    }

    /// The file name of the recipe's output page.
    pub fn file_name(&self) -> String {
        page_file_name(&self.title)
    }

    /// Every reference made from the recipe's leaf steps, in document order.
    pub fn leaf_references(&self) -> impl Iterator<Item = &str> {
        let steps = &self.steps;
        steps
            .all_leaves()
            .into_iter()
            .flat_map(move |leaf| steps[leaf].references.iter().map(String::as_str))
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.servings.is_empty() {
            f.write_str(&self.title)
        } else {
            write!(f, "{} - Serves: {}", self.title, self.servings)
        }
    }
}

/// The output file name for the recipe titled `title`: spaces become
/// underscores and the result is lower-cased.
pub fn page_file_name(title: &str) -> String {
    format!("{}.html", title.replace(' ', "_")).to_lowercase()
}

/// Derives a recipe title from a source path: the file name up to its first
/// `.`, with underscores replaced by spaces, title-cased.
pub fn title_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let stem = file_name.split('.').next().unwrap_or(file_name);
    Some(title_case(&stem.replace('_', " ")))
}

/// Loads [`Recipe`] objects from source documents.
pub struct Loader<'a> {
    extractor: &'a ReferenceExtractor,
    indent_width: usize,
}

impl<'a> Loader<'a> {
    /// Constructs a new loader. `indent_width` is the number of whitespace
    /// characters per nesting level in the `recipe` field.
    pub fn new(extractor: &'a ReferenceExtractor, indent_width: usize) -> Loader<'a> {
        Loader {
            extractor,
            indent_width,
        }
    }

    /// Parses a single [`Recipe`] from a source document. The title is taken
    /// from `path`, not from the document's contents.
    pub fn load_str(&self, path: &Path, input: &str) -> Result<Recipe> {
        let title = title_from_path(path)
            .ok_or_else(|| Error::InvalidFileName(path.to_owned()))?;
        let document: toml::Table = toml::from_str(input)?;

        let servings = document.get("servings").ok_or(Error::MissingField("servings"))?;
        let tags = document.get("tags").ok_or(Error::MissingField("tags"))?;
        let block = match document.get("recipe").or_else(|| document.get("recipie")) {
            Some(toml::Value::String(block)) => block,
            Some(_) => {
                return Err(Error::InvalidField {
                    field: "recipe",
                    expected: "a string",
                })
            }
            None => return Err(Error::MissingField("recipe")),
        };

        Ok(Recipe {
            title,
            servings: display_value(servings),
            tags: list_items("tags", tags)?,
            flavors: match document.get("flavors") {
                Some(flavors) => Some(list_items("flavors", flavors)?),
                None => None,
            },
            steps: parse_steps(block, self.extractor, self.indent_width),
            sections: document
                .iter()
                .filter(|(name, _)| !RESERVED_KEYS.contains(&name.as_str()))
                .map(|(name, value)| (name.clone(), display_value(value)))
                .collect(),
            used_in: Vec::new(),
        })
    }

    /// Loads the recipe at `path`, annotating any failure with the path.
    pub fn load_file(&self, path: &Path) -> Result<Recipe> {
        let load = || -> Result<Recipe> {
            use std::io::Read;
            let mut contents = String::new();
            File::open(path)?.read_to_string(&mut contents)?;
            self.load_str(path, &contents)
        };
        load().map_err(|e| Error::Annotated(format!("loading recipe `{}`", path.display()), Box::new(e)))
    }

    /// Finds every `.toml` document directly in `source_directory`, in file
    /// name order. Subdirectories are not searched.
    pub fn discover(&self, source_directory: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for result in WalkDir::new(source_directory)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = result?;
            if entry.file_type().is_file()
                && entry.path().extension().map_or(false, |ext| ext == RECIPE_EXTENSION)
            {
                paths.push(entry.into_path());
            }
        }
        Ok(paths)
    }

    /// Loads every recipe in `source_directory` and returns them sorted by
    /// title. The first document that fails to load aborts the whole load, as
    /// does a second document with an already-seen title.
    pub fn load_recipes(&self, source_directory: &Path) -> Result<Vec<Recipe>> {
        let mut seen = HashMap::new();
        let mut recipes = Vec::new();
        for path in self.discover(source_directory)? {
            log::debug!("loading `{}`", path.display());
            let recipe = self.load_file(&path)?;
            claim_title(&mut seen, &recipe.title, &path)?;
            recipes.push(recipe);
        }
        recipes.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(recipes)
    }

    /// Like [`Loader::load_recipes`], but documents that fail to load or
    /// repeat a title are logged and skipped. Only failures to walk
    /// `source_directory` abort.
    pub fn load_recipes_lenient(&self, source_directory: &Path) -> Result<Vec<Recipe>> {
        let mut seen = HashMap::new();
        let mut recipes = Vec::new();
        for path in self.discover(source_directory)? {
            log::debug!("loading `{}`", path.display());
            let loaded = self
                .load_file(&path)
                .and_then(|recipe| claim_title(&mut seen, &recipe.title, &path).map(|_| recipe));
            match loaded {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => log::warn!("skipping document: {}", e),
            }
        }
        recipes.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(recipes)
    }
}

/// Records that `path` provides `title`, failing if another document already
/// does.
fn claim_title(seen: &mut HashMap<String, PathBuf>, title: &str, path: &Path) -> Result<()> {
    if let Some(first) = seen.get(title) {
        return Err(Error::DuplicateTitle {
            title: title.to_owned(),
            first: first.clone(),
            second: path.to_owned(),
        });
    }
    seen.insert(title.to_owned(), path.to_owned());
    Ok(())
}

/// Document keys with a fixed meaning. Every other key is an extra section.
const RESERVED_KEYS: [&str; 5] = ["servings", "tags", "flavors", "recipe", "recipie"];

/// Reads a list written either as a comma-separated string or as an array of
/// strings. Items are trimmed and title-cased; empty items are dropped.
fn list_items(field: &'static str, value: &toml::Value) -> Result<Vec<String>> {
    let invalid = || Error::InvalidField {
        field,
        expected: "a comma-separated string or an array of strings",
    };
    let items: Vec<&str> = match value {
        toml::Value::String(text) => text.split(',').collect(),
        toml::Value::Array(values) => values
            .iter()
            .map(|item| item.as_str().ok_or_else(invalid))
            .collect::<Result<_>>()?,
        _ => return Err(invalid()),
    };
    Ok(items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(title_case)
        .collect())
}

/// Strings are displayed verbatim; everything else in TOML notation.
fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Represents the result of a [`Recipe`]-load operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a [`Recipe`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a required field is absent from a document.
    MissingField(&'static str),

    /// Returned when a field has the wrong shape.
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    /// Returned when a document isn't valid TOML.
    DeserializeToml(toml::de::Error),

    /// Returned when two documents derive the same title.
    DuplicateTitle {
        title: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Returned when a title can't be derived from a file name.
    InvalidFileName(PathBuf),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingField(field) => {
                write!(f, "missing required field `{}`", field)
            }
            Error::InvalidField { field, expected } => {
                write!(f, "field `{}` must be {}", field, expected)
            }
            Error::DeserializeToml(err) => err.fmt(f),
            Error::DuplicateTitle {
                title,
                first,
                second,
            } => write!(
                f,
                "`{}` and `{}` both have the title `{}`",
                first.display(),
                second.display(),
                title
            ),
            Error::InvalidFileName(path) => {
                write!(f, "invalid file name: {:?}", path)
            }
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingField(_) => None,
            Error::InvalidField { .. } => None,
            Error::DeserializeToml(err) => Some(err),
            Error::DuplicateTitle { .. } => None,
            Error::InvalidFileName(_) => None,
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<toml::de::Error> for Error {
    /// Converts a [`toml::de::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`toml`] deserialization functions.
    fn from(err: toml::de::Error) -> Error {
        Error::DeserializeToml(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SOUP: &str = r#"
servings = 4
tags = "dinner, soup ,"
notes = "Freezes <i>well</i>."
recipe = """
Pot
  add *Stock*
  simmer
Serve"""
"#;

    fn load(name: &str, input: &str) -> Result<Recipe> {
        let extractor = ReferenceExtractor::default();
        Loader::new(&extractor, 2).load_str(Path::new(name), input)
    }

    #[test]
    fn test_load_str() -> Result<()> {
        let recipe = load("inputs/tomato_soup.toml", SOUP)?;
        assert_eq!("Tomato Soup", recipe.title);
        assert_eq!("4", recipe.servings);
        assert_eq!(vec!["Dinner", "Soup"], recipe.tags);
        assert_eq!(None, recipe.flavors);
        assert_eq!(
            vec![("notes".to_owned(), "Freezes <i>well</i>.".to_owned())],
            recipe.sections
        );
        assert_eq!(1, recipe.depth());
        assert_eq!(vec!["Stock"], recipe.leaf_references().collect::<Vec<_>>());
        assert_eq!("tomato_soup.html", recipe.file_name());
        assert_eq!("Tomato Soup - Serves: 4", recipe.to_string());
        Ok(())
    }

    #[test]
    fn test_flavors_present_but_empty() -> Result<()> {
        let input = format!("flavors = \"\"\n{}", SOUP);
        let recipe = load("soup.toml", &input)?;
        assert_eq!(Some(Vec::<String>::new()), recipe.flavors);
        Ok(())
    }

    #[test]
    fn test_list_fields_accept_arrays() -> Result<()> {
        let input = format!("flavors = [\"savory\", \"UMAMI\"]\n{}", SOUP);
        let recipe = load("soup.toml", &input)?;
        assert_eq!(Some(vec!["Savory".to_owned(), "Umami".to_owned()]), recipe.flavors);
        Ok(())
    }

    #[test]
    fn test_legacy_recipe_key() -> Result<()> {
        let recipe = load(
            "bread.toml",
            "servings = \"1 loaf\"\ntags = \"Baking\"\nrecipie = \"Knead\"",
        )?;
        assert_eq!("1 loaf", recipe.servings);
        assert_eq!(1, recipe.steps.len());
        assert!(recipe.sections.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_field() {
        match load("bread.toml", "servings = 2\nrecipe = \"Knead\"") {
            Err(Error::MissingField(field)) => assert_eq!("tags", field),
            other => panic!("expected missing field error, got {:?}", other.map(|r| r.title)),
        }
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            load("bread.toml", "servings = "),
            Err(Error::DeserializeToml(_))
        ));
    }

    #[test]
    fn test_date_sections_display_as_written() -> Result<()> {
        let input = format!("{}made = 1979-05-27\n", SOUP);
        let recipe = load("soup.toml", &input)?;
        assert_eq!(
            vec![
                ("notes".to_owned(), "Freezes <i>well</i>.".to_owned()),
                ("made".to_owned(), "1979-05-27".to_owned()),
            ],
            recipe.sections
        );
        Ok(())
    }

    #[test]
    fn test_sections_keep_document_order() -> Result<()> {
        let recipe = load(
            "bread.toml",
            "zest = \"lemon\"\nservings = 2\ntags = \"Baking\"\nacidity = 3.5\nrecipe = \"Knead\"",
        )?;
        assert_eq!(
            vec![
                ("zest".to_owned(), "lemon".to_owned()),
                ("acidity".to_owned(), "3.5".to_owned()),
            ],
            recipe.sections
        );
        Ok(())
    }

    #[test]
    fn test_list_field_of_wrong_type() {
        match load("bread.toml", "servings = 2\ntags = 5\nrecipe = \"Knead\"") {
            Err(Error::InvalidField { field, .. }) => assert_eq!("tags", field),
            other => panic!("expected invalid field error, got {:?}", other.map(|r| r.title)),
        }

        let err = load(
            "bread.toml",
            "servings = 2\ntags = \"Baking\"\nflavors = [1, 2]\nrecipe = \"Knead\"",
        )
        .map(|r| r.title)
        .unwrap_err();
        assert_eq!(
            "field `flavors` must be a comma-separated string or an array of strings",
            err.to_string()
        );
    }

    #[test]
    fn test_recipe_field_must_be_text() {
        assert!(matches!(
            load("bread.toml", "servings = 2\ntags = \"\"\nrecipe = [\"Knead\"]"),
            Err(Error::InvalidField { field: "recipe", .. })
        ));
    }

    fn write_recipe(path: &Path) -> std::io::Result<()> {
        std::fs::write(path, "servings = 2\ntags = \"Soup\"\nrecipe = \"Boil\"")
    }

    #[test]
    fn test_discover_ignores_subdirectories() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_recipe(&dir.path().join("soup.toml"))?;
        std::fs::create_dir(dir.path().join("drafts"))?;
        write_recipe(&dir.path().join("drafts").join("soup.toml"))?;

        let extractor = ReferenceExtractor::default();
        let loader = Loader::new(&extractor, 2);
        assert_eq!(vec![dir.path().join("soup.toml")], loader.discover(dir.path())?);
        assert_eq!(1, loader.load_recipes(dir.path())?.len());
        Ok(())
    }

    #[test]
    fn test_duplicate_titles() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_recipe(&dir.path().join("soup.toml"))?;
        write_recipe(&dir.path().join("soup.old.toml"))?;

        let extractor = ReferenceExtractor::default();
        let loader = Loader::new(&extractor, 2);
        match loader.load_recipes(dir.path()) {
            Err(Error::DuplicateTitle { title, first, second }) => {
                assert_eq!("Soup", title);
                assert_eq!(dir.path().join("soup.old.toml"), first);
                assert_eq!(dir.path().join("soup.toml"), second);
            }
            other => panic!("expected duplicate title error, got {:?}", other.map(|r| r.len())),
        }

        let recipes = loader.load_recipes_lenient(dir.path())?;
        assert_eq!(1, recipes.len());
        Ok(())
    }

    #[test]
    fn test_title_from_path() {
        assert_eq!(
            Some("Chicken Stock".to_owned()),
            title_from_path(Path::new("/x/chicken_STOCK.v2.toml"))
        );
    }

    #[test]
    fn test_page_file_name() {
        assert_eq!("pie_crust.html", page_file_name("Pie Crust"));
    }

    #[test]
    fn test_display_without_servings() -> Result<()> {
        let recipe = load("toast.toml", "servings = \"\"\ntags = \"\"\nrecipe = \"Toast\"")?;
        assert_eq!("Toast", recipe.to_string());
        assert!(recipe.tags.is_empty());
        Ok(())
    }
}
