use crate::index::{index_flavors, index_tags};
use crate::recipe::Recipe;
use crate::reference::ReferenceExtractor;
use crate::table::SpanTableRenderer;
use crate::value::{index_value, recipe_value};
use gtmpl::{Template, Value};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The file name of the tag index page.
pub const TAG_INDEX_FILE: &str = "index.html";

/// The file name of the flavor index page.
pub const FLAVOR_INDEX_FILE: &str = "flavor.html";

/// Responsible for rendering, templating, and writing HTML pages to disk from
/// [`Recipe`]s.
pub struct Writer<'a> {
    /// The template for recipe pages.
    pub recipe_template: &'a Template,

    /// The template for the tag and flavor index pages.
    pub index_template: &'a Template,

    /// The directory in which the index pages are written
    /// (`{output_directory}/index.html` and `{output_directory}/flavor.html`).
    pub output_directory: &'a Path,

    /// The directory in which recipe pages are written. Index pages link to
    /// recipes relative to `output_directory`, so this must be a child of it.
    pub recipes_output_directory: &'a Path,

    /// Renders references inside of step text as links.
    pub extractor: &'a ReferenceExtractor,

    /// The heading of the tag index page.
    pub title: &'a str,
}

impl Writer<'_> {
    /// Takes a single [`Page`], templates it, and writes it to disk.
    fn write_page(&self, page: &Page) -> Result<()> {
        let context = gtmpl::Context::from(page.to_value()).map_err(Error::Template)?;
        page.template
            .execute(&mut std::fs::File::create(&page.file_path)?, &context)?;
        log::debug!("wrote `{}`", page.file_path.display());
        Ok(())
    }

    /// Writes a page for each recipe plus the tag and flavor index pages.
    /// Returns the number of pages written.
    pub fn write_recipes(&self, recipes: &[Recipe]) -> Result<usize> {
        std::fs::create_dir_all(self.recipes_output_directory)?;
        let mut written = 0;
        for page in self.pages(recipes) {
            self.write_page(&page)?;
            written += 1;
        }
        Ok(written)
    }

    /// Creates all of the recipe and index [`Page`]s for a set of
    /// [`Recipe`]s.
    fn pages(&self, recipes: &[Recipe]) -> Vec<Page> {
        let mut pages = self.recipe_pages(recipes);
        pages.extend(self.index_pages(recipes));
        pages
    }

    /// Creates one [`Page`] per recipe, rendering its step table.
    fn recipe_pages(&self, recipes: &[Recipe]) -> Vec<Page> {
        let renderer = SpanTableRenderer::new(self.extractor);
        recipes
            .iter()
            .map(|recipe| Page {
                item: recipe_value(recipe, renderer.render(&recipe.steps, &recipe.servings)),
                file_path: self.recipes_output_directory.join(recipe.file_name()),
                template: self.recipe_template,
            })
            .collect()
    }

    /// Creates the tag index and flavor index [`Page`]s.
    fn index_pages(&self, recipes: &[Recipe]) -> Vec<Page> {
        let prefix = self.recipes_prefix();
        vec![
            Page {
                item: index_value(self.title, &index_tags(recipes), &prefix),
                file_path: self.output_directory.join(TAG_INDEX_FILE),
                template: self.index_template,
            },
            Page {
                item: index_value("Flavors", &index_flavors(recipes), &prefix),
                file_path: self.output_directory.join(FLAVOR_INDEX_FILE),
                template: self.index_template,
            },
        ]
    }

    /// The relative link prefix from an index page to the recipe pages, e.g.
    /// `./recipes/`.
    fn recipes_prefix(&self) -> String {
        let relative = self
            .recipes_output_directory
            .strip_prefix(self.output_directory)
            .unwrap_or(self.recipes_output_directory);
        let mut prefix = String::from("./");
        for component in relative.components() {
            prefix.push_str(&component.as_os_str().to_string_lossy());
            prefix.push('/');
        }
        prefix
    }
}

/// An object representing an output HTML file. A [`Page`] can be converted to a
/// [`Value`] and thus rendered in a template via [`Page::to_value`].
struct Page<'a> {
    /// The main item for the page.
    item: Value,

    /// The target location on disk for the output file.
    file_path: PathBuf,

    /// The template with which the page will be rendered.
    template: &'a Template,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value`]. The result is a [`Value::Object`]
    /// with the single field `item`.
    fn to_value(&self) -> Value {
        use std::collections::HashMap;

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("item".to_owned(), self.item.clone());
        Value::Object(m)
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
