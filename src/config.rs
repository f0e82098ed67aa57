//! Loads the [`Config`] for a build from an optional `stepwise.yaml` project
//! file and an optional `theme/theme.yaml` theme file beside it.

use crate::indent::DEFAULT_INDENT_WIDTH;
use crate::reference::DEFAULT_MARKER;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The name of the project file.
pub const PROJECT_FILE: &str = "stepwise.yaml";

#[derive(Deserialize)]
struct IndentWidth(usize);
impl Default for IndentWidth {
    fn default() -> Self {
        IndentWidth(DEFAULT_INDENT_WIDTH)
    }
}

#[derive(Deserialize)]
struct Marker(String);
impl Default for Marker {
    fn default() -> Self {
        Marker(DEFAULT_MARKER.to_string())
    }
}

fn default_recipes() -> PathBuf {
    PathBuf::from("inputs")
}

fn default_output() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_title() -> String {
    String::from("Recipes")
}

#[derive(Deserialize)]
struct Project {
    #[serde(default = "default_recipes")]
    recipes: PathBuf,

    #[serde(default = "default_output")]
    output: PathBuf,

    #[serde(default)]
    indent_width: IndentWidth,

    #[serde(default)]
    reference_marker: Marker,

    #[serde(default = "default_title")]
    title: String,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            recipes: default_recipes(),
            output: default_output(),
            indent_width: IndentWidth::default(),
            reference_marker: Marker::default(),
            title: default_title(),
        }
    }
}

#[derive(Deserialize, Default)]
struct Theme {
    #[serde(default)]
    recipe_template: Vec<PathBuf>,

    #[serde(default)]
    index_template: Vec<PathBuf>,
}

/// Everything a build needs to know.
#[derive(Clone, Debug)]
pub struct Config {
    /// The directory searched for recipe documents.
    pub recipes_source_directory: PathBuf,

    /// The root of the generated site. `index.html` and `flavor.html` are
    /// written here.
    pub output_directory: PathBuf,

    /// The directory recipe pages are written to. Always a child of
    /// `output_directory`.
    pub recipes_output_directory: PathBuf,

    /// Template files for recipe pages. Empty means the built-in template.
    pub recipe_template: Vec<PathBuf>,

    /// Template files for the tag and flavor pages. Empty means the built-in
    /// template.
    pub index_template: Vec<PathBuf>,

    /// Whitespace characters per nesting level in recipe steps.
    pub indent_width: usize,

    /// The character wrapping references to other recipes.
    pub reference_marker: char,

    /// The heading of the tag index page.
    pub title: String,
}

/// The name of the recipe pages' directory below the output directory.
pub const RECIPES_DIRECTORY: &str = "recipes";

impl Config {
    /// Searches `dir` and its ancestors for a project file and loads it. If
    /// there is none, the defaults are used relative to `dir`.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(d) = current {
            let path = d.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path);
            }
            current = d.parent();
        }
        log::debug!("no `{}` found; using defaults", PROJECT_FILE);
        Config::from_project(dir, Project::default(), Theme::default())
    }

    /// Loads the project file at `path` and the theme file, if any, in the
    /// `theme` directory beside it.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path)?)?;
        let project_root = path.parent().unwrap_or_else(|| Path::new("."));

        let theme_file = project_root.join("theme").join("theme.yaml");
        let theme: Theme = if theme_file.is_file() {
            serde_yaml::from_reader(open(&theme_file)?)?
        } else {
            Theme::default()
        };
        Config::from_project(project_root, project, theme)
    }

    fn from_project(project_root: &Path, project: Project, theme: Theme) -> Result<Config> {
        if project.indent_width.0 == 0 {
            return Err(Error::InvalidIndentWidth);
        }
        let reference_marker = parse_marker(&project.reference_marker.0)?;
        let theme_dir = project_root.join("theme");
        let output_directory = project_root.join(&project.output);

        Ok(Config {
            recipes_source_directory: project_root.join(&project.recipes),
            recipes_output_directory: output_directory.join(RECIPES_DIRECTORY),
            output_directory,
            recipe_template: theme
                .recipe_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            index_template: theme
                .index_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            indent_width: project.indent_width.0,
            reference_marker,
            title: project.title,
        })
    }

    /// Replaces the recipe source directory.
    pub fn with_source(mut self, dir: PathBuf) -> Config {
        self.recipes_source_directory = dir;
        self
    }

    /// Replaces the output directory, moving the recipe pages along with it.
    pub fn with_output(mut self, dir: PathBuf) -> Config {
        self.recipes_output_directory = dir.join(RECIPES_DIRECTORY);
        self.output_directory = dir;
        self
    }
}

fn parse_marker(s: &str) -> Result<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_whitespace() => Ok(c),
        _ => Err(Error::InvalidMarker(s.to_owned())),
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| Error::Open {
        path: path.to_owned(),
        err,
    })
}

/// Represents the result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a [`Config`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a project or theme file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when a project or theme file isn't valid.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when `indent_width` is zero.
    InvalidIndentWidth,

    /// Returned when `reference_marker` isn't exactly one non-whitespace
    /// character.
    InvalidMarker(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening configuration file '{}': {}", path.display(), err)
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::InvalidIndentWidth => {
                write!(f, "`indent_width` must be greater than zero")
            }
            Error::InvalidMarker(marker) => write!(
                f,
                "`reference_marker` must be a single non-whitespace character, got {:?}",
                marker
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::DeserializeYaml(err) => Some(err),
            Error::InvalidIndentWidth => None,
            Error::InvalidMarker(_) => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_project_file() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let config = Config::from_directory(dir.path())?;
        assert_eq!(dir.path().join("inputs"), config.recipes_source_directory);
        assert_eq!(dir.path().join("outputs"), config.output_directory);
        assert_eq!(
            dir.path().join("outputs").join("recipes"),
            config.recipes_output_directory
        );
        assert_eq!(2, config.indent_width);
        assert_eq!('*', config.reference_marker);
        assert!(config.recipe_template.is_empty());
        Ok(())
    }

    #[test]
    fn test_project_file_found_in_parent() -> Result<()> {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(PROJECT_FILE),
            "recipes: cards\noutput: site\nindent_width: 4\nreference_marker: \"|\"\ntitle: Family Cookbook\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("theme")).unwrap();
        fs::write(
            dir.path().join("theme").join("theme.yaml"),
            "recipe_template: [base.html, recipe.html]\n",
        )
        .unwrap();
        let nested = dir.path().join("cards").join("soups");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::from_directory(&nested)?;
        assert_eq!(dir.path().join("cards"), config.recipes_source_directory);
        assert_eq!(dir.path().join("site"), config.output_directory);
        assert_eq!(4, config.indent_width);
        assert_eq!('|', config.reference_marker);
        assert_eq!("Family Cookbook", config.title);
        assert_eq!(
            vec![
                dir.path().join("theme").join("base.html"),
                dir.path().join("theme").join("recipe.html"),
            ],
            config.recipe_template
        );
        assert!(config.index_template.is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PROJECT_FILE);

        fs::write(&path, "indent_width: 0\n").unwrap();
        assert!(matches!(
            Config::from_project_file(&path),
            Err(Error::InvalidIndentWidth)
        ));

        fs::write(&path, "reference_marker: \"**\"\n").unwrap();
        assert!(matches!(
            Config::from_project_file(&path),
            Err(Error::InvalidMarker(_))
        ));
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let config = Config::from_directory(dir.path())?
            .with_source(PathBuf::from("/src"))
            .with_output(PathBuf::from("/out"));
        assert_eq!(PathBuf::from("/src"), config.recipes_source_directory);
        assert_eq!(PathBuf::from("/out/recipes"), config.recipes_output_directory);
        Ok(())
    }
}
