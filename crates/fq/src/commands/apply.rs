//! Apply command implementation.
//!
//! Reads a JSON array of records, builds the user filters from `--where`
//! conditions and an optional filter file, takes the application filters
//! from the config, and prints the records matching both.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use filter_engine::filter::{
    apply, combine_filters, into_filters, json_field, FieldPath, Filter, FilterDefinition, Value,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::conditions::parse_condition;
use super::config::{load_config, Config};
use super::{CommandContext, CommandError, Result};

/// Options for the apply command.
#[derive(Debug, Default)]
pub struct ApplyOptions {
    /// Records file; stdin when absent.
    pub records: Option<PathBuf>,
    /// Raw `--where` conditions.
    pub conditions: Vec<String>,
    /// Additional user filter definitions.
    pub filters: Option<PathBuf>,
    /// Force case-sensitive `--where` conditions.
    pub case_sensitive: bool,
    /// Disable date detection.
    pub no_dates: bool,
    /// Ignore the config's application filters.
    pub no_app_filters: bool,
    /// Print only the count.
    pub count: bool,
    /// Single-line output.
    pub compact: bool,
}

/// Contents of a filter definitions file: a bare list or `filters = [...]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum FilterFile {
    List(Vec<FilterDefinition>),
    Table {
        #[serde(default)]
        filters: Vec<FilterDefinition>,
    },
}

impl FilterFile {
    fn into_definitions(self) -> Vec<FilterDefinition> {
        match self {
            FilterFile::List(filters) | FilterFile::Table { filters } => filters,
        }
    }
}

/// Executes the apply command.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, a condition is
/// malformed, or a filter fails during evaluation.
pub fn execute(ctx: &CommandContext, opts: &ApplyOptions) -> Result<()> {
    let config = load_config(ctx.config_path.as_deref())?;
    let input = read_input(opts.records.as_deref())?;
    let records = parse_records(&input)?;

    let (user, application) = build_filters(opts, &config)?;
    let matched = filter_records(&records, user, application, detect_dates(opts, &config))?;

    if ctx.verbose {
        log::info!("{} of {} records matched", matched.len(), records.len());
    }
    println!("{}", render(&matched, opts)?);
    Ok(())
}

fn detect_dates(opts: &ApplyOptions, config: &Config) -> bool {
    config.detect_dates && !opts.no_dates
}

/// Builds the user and application filter lists.
pub fn build_filters(opts: &ApplyOptions, config: &Config) -> Result<(Vec<Filter>, Vec<Filter>)> {
    let detect_dates = detect_dates(opts, config);
    let case_sensitive = opts.case_sensitive || config.case_sensitive;

    let mut user = opts
        .conditions
        .iter()
        .map(|c| parse_condition(c, case_sensitive, detect_dates))
        .collect::<Result<Vec<_>>>()?;

    if let Some(path) = &opts.filters {
        let definitions = load_filter_file(path)?;
        user.extend(into_filters(definitions, detect_dates)?);
    }

    let application = if opts.no_app_filters {
        Vec::new()
    } else {
        into_filters(config.filters.clone(), detect_dates)?
    };

    log::debug!(
        "{} user filters, {} application filters",
        user.len(),
        application.len()
    );
    Ok((user, application))
}

/// Combines the two filter lists and applies them to `records`.
///
/// Record strings are read as dates only on fields that some leaf compares
/// against a date operand; everywhere else they stay text, so string
/// operators see the raw string.
pub fn filter_records(
    records: &[JsonValue],
    user: Vec<Filter>,
    application: Vec<Filter>,
    detect_dates: bool,
) -> Result<Vec<&JsonValue>> {
    let tree = combine_filters(user, application);
    let mut date_fields = HashSet::new();
    if detect_dates {
        if let Some(tree) = &tree {
            collect_date_fields(tree, &mut date_fields);
        }
    }
    log::debug!("date fields: {date_fields:?}");

    let matched = apply(records, tree.as_ref(), |record, path| {
        json_field(record, path, date_fields.contains(path))
    })?;
    Ok(matched)
}

/// Collects the paths of leaves whose operands are dates.
fn collect_date_fields<'a>(filter: &'a Filter, fields: &mut HashSet<&'a FieldPath>) {
    match filter {
        Filter::Leaf(node) => {
            let is_date = |v: &Value| matches!(v, Value::Date(_));
            if is_date(node.value1()) || node.value2().is_some_and(is_date) {
                fields.insert(node.path());
            }
        }
        Filter::Custom(_) => {}
        Filter::Combinator(combinator) => {
            for child in &combinator.children {
                collect_date_fields(child, fields);
            }
        }
    }
}

/// Formats matched records (or their count) for stdout.
pub fn render(matched: &[&JsonValue], opts: &ApplyOptions) -> Result<String> {
    if opts.count {
        return Ok(matched.len().to_string());
    }
    let output = if opts.compact {
        serde_json::to_string(matched)?
    } else {
        serde_json::to_string_pretty(matched)?
    };
    Ok(output)
}

/// Parses the records input, which must be a JSON array.
pub fn parse_records(input: &str) -> Result<Vec<JsonValue>> {
    let value: JsonValue = serde_json::from_str(input)?;
    match value {
        JsonValue::Array(records) => Ok(records),
        other => Err(CommandError::Input(format!(
            "records must be a JSON array, got {}",
            json_kind(&other)
        ))),
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Loads filter definitions from a `.toml` file or, otherwise, JSON.
fn load_filter_file(path: &Path) -> Result<Vec<FilterDefinition>> {
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let file: FilterFile = if is_toml {
        toml::from_str(&content).map_err(|e| {
            CommandError::Input(format!("invalid filter file {}: {}", path.display(), e))
        })?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(file.into_definitions())
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
