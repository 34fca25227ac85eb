use crate::lint::ReportFormat;
use crate::lint::rule::{BemSettings, LayoutSettings, RuleSettings};
use crate::source::DEFAULT_EXCLUDES;
use anyhow::{Context, Result};
use clap::Parser;
use indexmap::IndexSet;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_PROFILE: &str = "recommended";

#[derive(Debug, Clone)]
pub struct LintConfig {
    pub paths: Vec<PathBuf>,
    pub profile: String,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
    pub include: Vec<String>,
    /// Default excludes followed by user patterns
    pub exclude: Vec<String>,
    /// Restrict the run to these rule ids
    pub rules: Option<Vec<String>>,
    pub disabled_rules: Vec<String>,
    pub max_warnings: Option<usize>,
    pub jobs: Option<usize>,
    pub settings: RuleSettings,
}

impl LintConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            paths: cli_paths,
            config,
            profile: cli_profile,
            format: cli_format,
            output,
            include: cli_include,
            exclude: cli_exclude,
            rule: cli_rules,
            disable: cli_disabled,
            max_warnings: cli_max_warnings,
            jobs: cli_jobs,
            list_rules: _,
            print_schema: _,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            paths: file_paths,
            profile: file_profile,
            format: file_format,
            include: file_include,
            exclude: file_exclude,
            rules: file_rules,
            disabled_rules: file_disabled,
            max_warnings: file_max_warnings,
            jobs: file_jobs,
            bem: file_bem,
            layout: file_layout,
        } = file_config;

        let paths = if cli_paths.is_empty() {
            file_paths.unwrap_or_else(|| vec![PathBuf::from(".")])
        } else {
            cli_paths
        };
        anyhow::ensure!(!paths.is_empty(), "at least one path must be provided");

        let profile = cli_profile
            .or(file_profile)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let format = cli_format.or(file_format).unwrap_or_default();

        let include = normalize_list(cli_include.or(file_include).unwrap_or_default());

        let mut exclude: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| (*s).to_string()).collect();
        exclude.extend(normalize_list(cli_exclude.or(file_exclude).unwrap_or_default()));

        let rules = cli_rules
            .or(file_rules)
            .map(normalize_ids)
            .filter(|ids| !ids.is_empty());

        let disabled_rules = normalize_ids(cli_disabled.or(file_disabled).unwrap_or_default());

        let max_warnings = cli_max_warnings.or(file_max_warnings);

        let jobs = cli_jobs.or(file_jobs);
        if let Some(jobs) = jobs {
            anyhow::ensure!(jobs > 0, "jobs must be at least 1");
        }

        let settings = RuleSettings {
            bem: file_bem.unwrap_or_default(),
            layout: file_layout.unwrap_or_default(),
        };

        Ok(Self {
            paths,
            profile,
            format,
            output,
            include,
            exclude,
            rules,
            disabled_rules,
            max_warnings,
            jobs,
            settings,
        })
    }

    pub fn ensure_paths_exist(&self) -> Result<()> {
        for path in &self.paths {
            anyhow::ensure!(path.exists(), "path {:?} does not exist", path);
        }
        Ok(())
    }
}

fn normalize_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Lowercased ids, first occurrence wins.
fn normalize_ids(values: Vec<String>) -> Vec<String> {
    normalize_list(values)
        .into_iter()
        .map(|id| id.to_ascii_lowercase())
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "vanilla-lint",
    about = "Lint HTML, CSS and JavaScript against a vanilla front-end style guide",
    version
)]
pub struct CliArgs {
    #[arg(value_name = "PATH", help = "Files or directories to lint (default: .)")]
    pub paths: Vec<PathBuf>,

    #[arg(
        long,
        env = "VANILLA_LINT_CONFIG",
        value_name = "FILE",
        help = "Path to a configuration file (YAML, JSON or TOML)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "VANILLA_LINT_PROFILE",
        value_name = "NAME|FILE",
        help = "Rule profile: recommended, strict, or a TOML profile file"
    )]
    pub profile: Option<String>,

    #[arg(
        long,
        env = "VANILLA_LINT_FORMAT",
        value_enum,
        value_name = "FORMAT",
        help = "Report format"
    )]
    pub format: Option<ReportFormat>,

    #[arg(
        long,
        short = 'o',
        value_name = "FILE",
        help = "Write the report to a file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "GLOB",
        value_delimiter = ',',
        help = "Only lint paths matching these globs"
    )]
    pub include: Option<Vec<String>>,

    #[arg(
        long,
        value_name = "GLOB",
        value_delimiter = ',',
        help = "Skip paths matching these globs (in addition to the defaults)"
    )]
    pub exclude: Option<Vec<String>>,

    #[arg(
        long,
        value_name = "ID",
        value_delimiter = ',',
        help = "Run only these rules"
    )]
    pub rule: Option<Vec<String>>,

    #[arg(
        long,
        value_name = "ID",
        value_delimiter = ',',
        help = "Turn off these rules"
    )]
    pub disable: Option<Vec<String>>,

    #[arg(
        long,
        value_name = "N",
        help = "Fail when more than N warnings are reported",
        value_parser = clap::value_parser!(usize)
    )]
    pub max_warnings: Option<usize>,

    #[arg(
        long,
        short = 'j',
        env = "VANILLA_LINT_JOBS",
        value_name = "N",
        help = "Number of files linted concurrently",
        value_parser = clap::value_parser!(usize)
    )]
    pub jobs: Option<usize>,

    #[arg(long, help = "Print the available rules and exit")]
    pub list_rules: bool,

    #[arg(long, help = "Print the JSON schema of the report and exit")]
    pub print_schema: bool,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    paths: Option<Vec<PathBuf>>,
    profile: Option<String>,
    format: Option<ReportFormat>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    rules: Option<Vec<String>>,
    disabled_rules: Option<Vec<String>>,
    max_warnings: Option<usize>,
    jobs: Option<usize>,
    bem: Option<BemSettings>,
    layout: Option<LayoutSettings>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        "toml" => toml::from_str(&contents)
            .with_context(|| format!("failed to parse TOML config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
