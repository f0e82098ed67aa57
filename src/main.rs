use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use stepwise::build::build_site;
use stepwise::config::Config;
use stepwise::recipe::Loader;
use stepwise::reference::ReferenceExtractor;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = App::new("stepwise")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds cross-linked HTML recipe cards from indented recipe files")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site")
                .arg(
                    Arg::with_name("source")
                        .long("source")
                        .short("s")
                        .takes_value(true)
                        .help("The directory containing recipe documents"),
                )
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .help("The directory the site is written to"),
                )
                .arg(
                    Arg::with_name("keep-going")
                        .long("keep-going")
                        .short("k")
                        .help("Skip recipe documents that fail to load instead of aborting"),
                ),
        )
        .subcommand(
            SubCommand::with_name("outline")
                .about("Prints the parsed step outline of a recipe document")
                .arg(
                    Arg::with_name("file")
                        .required(true)
                        .help("The recipe document"),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        ("build", Some(m)) => build(m),
        ("outline", Some(m)) => outline(m),
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("ERROR {}", e);
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("  caused by: {}", err);
            source = err.source();
        }
        std::process::exit(1);
    }
}

fn config() -> Result<Config, Box<dyn Error>> {
    Ok(Config::from_directory(&std::env::current_dir()?)?)
}

fn build(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let mut config = config()?;
    if let Some(source) = matches.value_of("source") {
        config = config.with_source(PathBuf::from(source));
    }
    if let Some(output) = matches.value_of("output") {
        config = config.with_output(PathBuf::from(output));
    }
    build_site(&config, matches.is_present("keep-going"))?;
    Ok(())
}

fn outline(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let config = config()?;
    let extractor = ReferenceExtractor::new(config.reference_marker);
    let loader = Loader::new(&extractor, config.indent_width);
    // "file" is required, so clap guarantees a value
    let path = Path::new(matches.value_of("file").unwrap_or_default());
    let recipe = loader.load_file(path)?;
    println!("{}", recipe);
    print!("{}", recipe.steps);
    Ok(())
}
