use crate::error::Error;
use crate::font::FontSource;
use crate::utils::{default_extensions, own_path, parse_extension_list, resolve_against};
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT: &str = "code_collection.pdf";
pub const DEFAULT_TITLE: &str = "Code Collection";
pub const DEFAULT_WIDTH: usize = 110;

/// Resolved settings for one conversion run.
#[derive(Debug, Clone)]
pub struct Config {
    pub source_directory: PathBuf,
    pub output_path: PathBuf,
    pub title: String,
    /// Characters per row before a line wraps.
    pub max_line_width: usize,
    /// File-name suffixes to include, each with a leading dot.
    pub extensions: HashSet<String>,
    /// Absolute paths never included.
    pub exclusions: HashSet<PathBuf>,
    pub include_tree: bool,
    pub font: FontSource,
    pub verbosity: u8,
    pub quiet: bool,
}

impl Config {
    /// Defaults for scanning `source_directory`.
    pub fn new(source_directory: impl Into<PathBuf>) -> Self {
        Self {
            source_directory: source_directory.into(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            title: DEFAULT_TITLE.to_string(),
            max_line_width: DEFAULT_WIDTH,
            extensions: default_extensions(),
            exclusions: HashSet::new(),
            include_tree: false,
            font: FontSource::default_cached(),
            verbosity: 0,
            quiet: false,
        }
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.source_directory.is_dir() {
            return Err(Error::NotADirectory(self.source_directory.clone()));
        }
        if self.max_line_width == 0 {
            return Err(Error::InvalidConfiguration(
                "width must be a positive number of characters".to_string(),
            ));
        }
        if self.extensions.is_empty() {
            return Err(Error::InvalidConfiguration(
                "extension list is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// User exclusions plus the running executable and the output document.
    pub fn effective_exclusions(&self) -> HashSet<PathBuf> {
        let mut exclusions = self.exclusions.clone();
        if let Some(own) = own_path() {
            exclusions.insert(own);
        }
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        exclusions.insert(resolve_against(&cwd, &self.output_path));
        exclusions
    }
}

/// Resolves a comma-separated `-x` list against the scan root.
pub fn parse_exclusions(list: &str, root: &Path) -> HashSet<PathBuf> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| resolve_against(root, Path::new(s)))
        .collect()
}

pub fn build_command() -> Command {
    Command::new("src2pdf")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Matias Hiltunen")
        .about("Collects source files into a single paginated PDF")
        .arg(
            Arg::new("directory")
                .value_name("DIRECTORY")
                .help("Directory to convert")
                .default_value("."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output PDF file path")
                .default_value(DEFAULT_OUTPUT),
        )
        .arg(
            Arg::new("title")
                .short('t')
                .long("title")
                .value_name("TITLE")
                .help("Document title")
                .default_value(DEFAULT_TITLE),
        )
        .arg(
            Arg::new("extensions")
                .short('e')
                .long("extensions")
                .value_name("LIST")
                .help("Comma-separated file extensions to include"),
        )
        .arg(
            Arg::new("width")
                .short('w')
                .long("width")
                .value_name("CHARS")
                .help("Maximum line width in characters")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64))
                .default_value("110"),
        )
        .arg(
            Arg::new("exclude")
                .short('x')
                .long("exclude")
                .value_name("LIST")
                .help("Comma-separated files to exclude (relative to DIRECTORY or absolute)"),
        )
        .arg(
            Arg::new("image")
                .short('i')
                .long("image")
                .help("Include a folder tree page")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("font")
                .long("font")
                .value_name("TTF")
                .help("Use a local TrueType font instead of the cached DejaVu Sans Mono"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v, -vv)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print warnings and errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
}

pub fn parse_args() -> Result<Config> {
    config_from_matches(&build_command().get_matches())
}

pub fn config_from_matches(matches: &ArgMatches) -> Result<Config> {
    let cwd = std::env::current_dir()?;

    let raw_dir = matches
        .get_one::<String>("directory")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let joined = cwd.join(&raw_dir);
    let source_directory = match std::fs::canonicalize(&joined) {
        Ok(dir) if dir.is_dir() => dir,
        _ => return Err(Error::NotADirectory(joined).into()),
    };

    let width = matches.get_one::<i64>("width").copied().unwrap_or(110);
    let max_line_width = usize::try_from(width)
        .ok()
        .filter(|w| *w > 0)
        .ok_or_else(|| {
            Error::InvalidConfiguration(format!(
                "width must be a positive number of characters, got {width}"
            ))
        })?;

    let mut config = Config::new(source_directory);
    config.max_line_width = max_line_width;

    if let Some(output) = matches.get_one::<String>("output") {
        config.output_path = PathBuf::from(output);
    }
    if let Some(title) = matches.get_one::<String>("title") {
        config.title = title.clone();
    }
    if let Some(list) = matches.get_one::<String>("extensions") {
        config.extensions = parse_extension_list(list);
    }
    if let Some(list) = matches.get_one::<String>("exclude") {
        config.exclusions = parse_exclusions(list, &config.source_directory);
    }
    if let Some(font) = matches.get_one::<String>("font") {
        config.font = FontSource::File(cwd.join(font));
    }
    config.include_tree = matches.get_flag("image");
    config.verbosity = matches.get_count("verbose");
    config.quiet = matches.get_flag("quiet");

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Result<Config> {
        let matches = build_command().try_get_matches_from(args)?;
        config_from_matches(&matches)
    }

    #[test]
    fn test_defaults() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().to_str().unwrap();

        let config = parse(&["src2pdf", dir]).unwrap();

        assert_eq!(config.source_directory, fs::canonicalize(dir).unwrap());
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.title, DEFAULT_TITLE);
        assert_eq!(config.max_line_width, DEFAULT_WIDTH);
        assert_eq!(config.extensions, default_extensions());
        assert!(config.exclusions.is_empty());
        assert!(!config.include_tree);
    }

    #[test]
    fn test_overrides() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().to_str().unwrap();

        let config = parse(&[
            "src2pdf", dir, "-o", "out.pdf", "-t", "My Code", "-e", "rs, .toml", "-w", "80",
            "-i", "-vv",
        ])
        .unwrap();

        assert_eq!(config.output_path, PathBuf::from("out.pdf"));
        assert_eq!(config.title, "My Code");
        assert_eq!(config.max_line_width, 80);
        assert_eq!(config.extensions.len(), 2);
        assert!(config.extensions.contains(".rs"));
        assert!(config.extensions.contains(".toml"));
        assert!(config.include_tree);
        assert_eq!(config.verbosity, 2);
    }

    #[test]
    fn test_exclusions_resolve_against_root() {
        let temp_dir = tempdir().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/gen.rs"), "").unwrap();
        let dir = root.to_str().unwrap();

        let config = parse(&["src2pdf", dir, "-x", "src/gen.rs, /abs/other.rs"]).unwrap();

        assert!(config.exclusions.contains(&root.join("src/gen.rs")));
        assert!(config.exclusions.contains(&PathBuf::from("/abs/other.rs")));
    }

    #[test]
    fn test_rejects_missing_directory() {
        let err = parse(&["src2pdf", "/definitely/not/here"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NotADirectory(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_width() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().to_str().unwrap();

        for width in ["0", "-5"] {
            let err = parse(&["src2pdf", dir, "-w", width]).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<Error>(),
                Some(Error::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_effective_exclusions_cover_output_and_self() {
        let temp_dir = tempdir().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        let mut config = Config::new(&root);
        config.output_path = root.join("out.pdf");

        let exclusions = config.effective_exclusions();

        assert!(exclusions.contains(&root.join("out.pdf")));
        if let Some(own) = own_path() {
            assert!(exclusions.contains(&own));
        }
    }
}
