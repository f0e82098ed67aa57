//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output site: loading every recipe
//! ([`crate::recipe`]), resolving references between them
//! ([`crate::resolve`]), and rendering recipe and index pages
//! ([`crate::write`]). All recipes are loaded before anything is resolved or
//! rendered, since a reference may point at any recipe.

use crate::config::Config;
use crate::recipe::{Error as LoadError, Loader};
use crate::reference::ReferenceExtractor;
use crate::resolve::resolve;
use crate::write::{Error as WriteError, Writer};
use gtmpl::Template;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The built-in recipe page template.
const DEFAULT_RECIPE_TEMPLATE: &str = include_str!("theme/recipe.html");

/// The built-in index page template.
const DEFAULT_INDEX_TEMPLATE: &str = include_str!("theme/index.html");

/// What a build produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub recipes: usize,
    pub backlinks: usize,
    pub pages: usize,
}

/// Builds the site from a [`Config`] object. With `keep_going`, documents
/// which fail to load are logged and left out instead of failing the build.
pub fn build_site(config: &Config, keep_going: bool) -> Result<Summary> {
    let extractor = ReferenceExtractor::new(config.reference_marker);
    let loader = Loader::new(&extractor, config.indent_width);

    // load every recipe before resolving anything
    let mut recipes = if keep_going {
        loader.load_recipes_lenient(&config.recipes_source_directory)?
    } else {
        loader.load_recipes(&config.recipes_source_directory)?
    };
    log::info!(
        "loaded {} recipes from `{}`",
        recipes.len(),
        config.recipes_source_directory.display()
    );

    let backlinks = resolve(&mut recipes);
    log::info!("resolved {} recipe references", backlinks);

    // Parse the template files.
    let recipe_template = parse_template(&config.recipe_template, DEFAULT_RECIPE_TEMPLATE)?;
    let index_template = parse_template(&config.index_template, DEFAULT_INDEX_TEMPLATE)?;

    // Blow away the old recipe pages so that renamed or deleted recipes don't
    // linger. The output root may hold other files, so it's left alone.
    rmdir(&config.recipes_output_directory)?;

    let writer = Writer {
        recipe_template: &recipe_template,
        index_template: &index_template,
        output_directory: &config.output_directory,
        recipes_output_directory: &config.recipes_output_directory,
        extractor: &extractor,
        title: &config.title,
    };
    let pages = writer.write_recipes(&recipes)?;
    log::info!(
        "wrote {} pages to `{}`",
        pages,
        config.output_directory.display()
    );

    Ok(Summary {
        recipes: recipes.len(),
        backlinks,
        pages,
    })
}

// Concatenates the template files and parses the result into a template. With
// no files, `default` is parsed instead.
fn parse_template<P: AsRef<Path>>(template_files: &[P], default: &str) -> Result<Template> {
    let mut contents = String::new();
    if template_files.is_empty() {
        contents.push_str(default);
    }
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(&template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during loading, writing,
/// cleaning output directories, parsing template files, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading recipes.
    Load(LoadError),

    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Load(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Load(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<LoadError> for Error {
    /// Converts [`LoadError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: LoadError) -> Error {
        Error::Load(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TESTDATA: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/recipes");

    fn config(output: &Path) -> Config {
        Config::from_directory(output)
            .unwrap()
            .with_source(PathBuf::from(TESTDATA))
            .with_output(output.to_owned())
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
    }

    #[test]
    fn test_build_site() -> Result<()> {
        let dir = TempDir::new()?;
        let summary = build_site(&config(dir.path()), false)?;
        assert_eq!(
            Summary {
                recipes: 3,
                backlinks: 2,
                pages: 5,
            },
            summary
        );

        let soup = read(dir.path().join("recipes").join("tomato_soup.html"));
        assert!(soup.contains("<h1>Tomato Soup</h1>"));
        assert!(soup.contains(r#"<a href="./chicken_stock.html">Chicken Stock</a>"#));
        assert!(soup.contains(r#"<td rowspan="2">Pot</td>"#));
        assert!(soup.contains(r#"<a href="../index.html#dinner">Dinner</a>"#));
        assert!(soup.contains(r#"<a href="../flavor.html#savory">Savory</a>"#));
        assert!(soup.contains("<h4>Notes:</h4>Serve hot."));
        assert!(!soup.contains("Used in"));

        let stock = read(dir.path().join("recipes").join("chicken_stock.html"));
        assert!(stock.contains("Used in"));
        assert!(stock.contains(r#"<a href="./gravy.html">Gravy</a>"#));
        assert!(stock.contains(r#"<a href="./tomato_soup.html">Tomato Soup</a>"#));
        assert!(!stock.contains("Flavors:"));

        let gravy = read(dir.path().join("recipes").join("gravy.html"));
        assert!(gravy.contains("<b>Flavors:</b>"));

        let index = read(dir.path().join("index.html"));
        assert!(index.contains(r#"<h3 id="dinner">Dinner</h3>"#));
        assert!(index.contains(r#"<a href="./recipes/gravy.html">Gravy</a>"#));
        assert!(index.contains(r#"<a href="./recipes/tomato_soup.html">Tomato Soup</a>"#));
        assert!(index.find(r#"id="basics""#) < index.find(r#"id="dinner""#));

        let flavor = read(dir.path().join("flavor.html"));
        assert!(flavor.contains(r#"<h3 id="savory">Savory</h3>"#));
        assert!(!flavor.contains("Chicken Stock"));
        Ok(())
    }

    #[test]
    fn test_rebuild_removes_stale_pages() -> Result<()> {
        let dir = TempDir::new()?;
        let stale = dir.path().join("recipes").join("old.html");
        fs::create_dir_all(stale.parent().unwrap())?;
        fs::write(&stale, "old")?;

        build_site(&config(dir.path()), false)?;
        assert!(!stale.exists());
        Ok(())
    }

    #[test]
    fn test_bad_document() -> Result<()> {
        let source = TempDir::new()?;
        let output = TempDir::new()?;
        fs::write(
            source.path().join("toast.toml"),
            "servings = 1\ntags = \"Breakfast\"\nrecipe = \"Toast\"",
        )?;
        fs::write(source.path().join("broken.toml"), "servings = 1\n")?;
        let config = config(output.path()).with_source(source.path().to_owned());

        match build_site(&config, false) {
            Err(Error::Load(err)) => assert!(err.to_string().contains("broken.toml")),
            other => panic!("expected a load error, got {:?}", other),
        }

        let summary = build_site(&config, true)?;
        assert_eq!(1, summary.recipes);
        assert!(output.path().join("recipes").join("toast.html").is_file());
        Ok(())
    }

    #[test]
    fn test_theme_override() -> Result<()> {
        let dir = TempDir::new()?;
        let template = dir.path().join("recipe.html");
        fs::write(&template, "{{ .item.title }}|{{ .item.servings }}")?;
        let mut config = config(dir.path());
        config.recipe_template = vec![template];

        build_site(&config, false)?;
        let gravy = read(dir.path().join("recipes").join("gravy.html"));
        assert_eq!("Gravy|2 cups ", gravy);
        Ok(())
    }
}
