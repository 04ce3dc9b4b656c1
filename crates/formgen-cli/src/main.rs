use clap::{Parser, Subcommand};
use formgen_spec::{
    DefinitionIssue, Emission, FormDefinition, FormState, ValidationResult, definition_schema,
    derive_schema, emit, parse_document, to_interchange,
};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const OUTPUT_DIR_VAR: &str = "FORMGEN_OUTPUT_DIR";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Form definition compiler CLI",
    long_about = "Derives validation rules, emits form components and translates interchange documents from a form definition file"
)]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence when set).
    #[arg(long, global = true, alias = "debug")]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Emit the component source for a form.
    Emit {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Write the source here instead of stdout (relative paths resolve under FORMGEN_OUTPUT_DIR).
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Print the validation rules derived for every field.
    Rules {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
    },
    /// Check preview values against the derived rules.
    Validate {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// JSON object of values keyed by field name.
        #[arg(long, value_name = "VALUES")]
        values: PathBuf,
    },
    /// Translate a form into an interchange document.
    Export {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Translate an interchange document into a form definition.
    Import {
        /// Path to the interchange document.
        #[arg(long, value_name = "DOC")]
        input: PathBuf,
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Report structural problems in a form definition.
    Check {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
    },
    /// Print the JSON Schema of form definition files.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Emit { form, out } => run_emit(form, out),
        Command::Rules { form } => run_rules(form),
        Command::Validate { form, values } => run_validate(form, values),
        Command::Export { form, out } => run_export(form, out),
        Command::Import { input, out } => run_import(input, out),
        Command::Check { form } => run_check(form),
        Command::Schema => print_json(&definition_schema()),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_emit(form_path: PathBuf, out: Option<PathBuf>) -> CliResult<()> {
    let form = load_compilable_form(&form_path)?;
    match emit(&form)? {
        Emission::Empty => {
            println!("{}", Emission::Empty);
            Ok(())
        }
        Emission::Source(source) => write_output(out, &source, "component"),
    }
}

fn run_rules(form_path: PathBuf) -> CliResult<()> {
    let form = load_compilable_form(&form_path)?;
    print_json(&derive_schema(&form))
}

fn run_validate(form_path: PathBuf, values_path: PathBuf) -> CliResult<()> {
    let form = load_compilable_form(&form_path)?;
    let values_json = fs::read_to_string(values_path)?;
    let values: Value = serde_json::from_str(&values_json)?;

    let result = derive_schema(&form).validate(&values);
    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!(
                "  {} - {}",
                error.path.as_deref().unwrap_or("<unknown>"),
                error.message
            );
        }
    }
    if !result.missing_required.is_empty() {
        println!(
            "Missing required values: {}",
            result.missing_required.join(", ")
        );
    }
    if !result.unknown_fields.is_empty() {
        println!("Unknown value fields: {}", result.unknown_fields.join(", "));
    }
}

fn run_export(form_path: PathBuf, out: Option<PathBuf>) -> CliResult<()> {
    let form = load_compilable_form(&form_path)?;
    let doc = serde_json::to_string_pretty(&to_interchange(&form))?;
    write_output(out, &doc, "interchange document")
}

fn run_import(input_path: PathBuf, out: Option<PathBuf>) -> CliResult<()> {
    let contents = fs::read_to_string(&input_path)?;
    let doc = parse_document(&contents)?;
    tracing::debug!(path = %input_path.display(), "parsed interchange document");
    let form = FormState::new().import(&doc).into_form();
    for issue in form.check() {
        tracing::warn!(%issue, "imported form violates an invariant");
    }
    let json = serde_json::to_string_pretty(&form)?;
    write_output(out, &json, "form definition")
}

fn run_check(form_path: PathBuf) -> CliResult<()> {
    let form = load_form(&form_path)?;
    let issues = form.check();
    if issues.is_empty() {
        println!("Form '{}' has no issues", form.name);
        return Ok(());
    }
    println!("Form '{}' has {} issue(s):", form.name, issues.len());
    for issue in &issues {
        println!("  - {}", issue);
    }
    Err(format!("{} issue(s) found", issues.len()).into())
}

fn load_form(path: &Path) -> CliResult<FormDefinition> {
    let contents = fs::read_to_string(path)?;
    let form: FormDefinition = serde_json::from_str(&contents)?;
    tracing::debug!(
        path = %path.display(),
        form = %form.name,
        fields = form.fields.len(),
        "loaded form definition"
    );
    Ok(form)
}

/// Loads a form and refuses it when two fields share a name; other issues
/// are only logged.
fn load_compilable_form(path: &Path) -> CliResult<FormDefinition> {
    let form = load_form(path)?;
    let mut duplicates = Vec::new();
    for issue in form.check() {
        match issue {
            DefinitionIssue::DuplicateName { name } => duplicates.push(name),
            other => tracing::warn!(issue = %other, "form definition issue"),
        }
    }
    if !duplicates.is_empty() {
        return Err(format!(
            "form '{}' has duplicate field names: {}",
            form.name,
            duplicates.join(", ")
        )
        .into());
    }
    Ok(form)
}

fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Relative `--out` paths land under FORMGEN_OUTPUT_DIR when it is set.
fn resolve_output(out: PathBuf, output_dir: Option<PathBuf>) -> PathBuf {
    match output_dir {
        Some(dir) if out.is_relative() && !dir.as_os_str().is_empty() => dir.join(out),
        _ => out,
    }
}

fn write_output(out: Option<PathBuf>, contents: &str, what: &str) -> CliResult<()> {
    let Some(out) = out else {
        println!("{}", contents);
        return Ok(());
    };
    let target = resolve_output(out, env::var_os(OUTPUT_DIR_VAR).map(PathBuf::from));
    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, contents)?;
    tracing::info!(path = %target.display(), "wrote {}", what);
    println!("Wrote {} to {}", what, target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_output_joins_relative_paths_only() {
        let dir = Some(PathBuf::from("/tmp/forms"));
        assert_eq!(
            resolve_output(PathBuf::from("Contact.tsx"), dir.clone()),
            PathBuf::from("/tmp/forms/Contact.tsx")
        );
        assert_eq!(
            resolve_output(PathBuf::from("/srv/Contact.tsx"), dir),
            PathBuf::from("/srv/Contact.tsx")
        );
        assert_eq!(
            resolve_output(PathBuf::from("Contact.tsx"), None),
            PathBuf::from("Contact.tsx")
        );
    }
}
