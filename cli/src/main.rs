use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use optline_core::{Catalog, MetadataProvider, Record, regroup_str, tokenize, validate_catalog};
use optline_engine::{
    CommandRegistry, Dispatcher, Execution, Handler, HandlerTable, ParseMode, ParseResult,
    ParserOptions, PlainPresenter,
};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "optline")]
#[command(version, about = "Inspect and exercise declarative command-line catalogs")]
struct Cli {
    /// Log parser decisions to stderr.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the tokens of a command line as JSON.
    Tokenize(RawArgs),
    /// Print the `|`-separated groups of a command line as JSON.
    Regroup(RawArgs),
    /// Parse a command line against a catalog and print the result.
    Parse(ParseArgs),
    /// Parse and dispatch a command line; every handler echoes its input.
    Run(RunArgs),
    /// Build every option type and command of a catalog.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct RawArgs {
    /// Command line; several values are joined with spaces.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    raw: Vec<String>,
}

#[derive(Debug, Args)]
struct CatalogArgs {
    /// Catalog file (JSON when the extension is .json, YAML otherwise).
    #[arg(long)]
    catalog: PathBuf,
    /// Parser options file (YAML).
    #[arg(long)]
    options: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    #[command(flatten)]
    raw: RawArgs,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
    #[command(flatten)]
    raw: RawArgs,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Catalog file (JSON when the extension is .json, YAML otherwise).
    #[arg(long)]
    catalog: PathBuf,
}

/// Serializable view of a [`ParseResult`].
#[derive(Debug, Serialize)]
struct ParseReport<'a> {
    raw: &'a str,
    #[serde(flatten)]
    mode: &'a ParseMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a Record>,
    remainder: &'a [String],
    errors: Vec<String>,
}

impl<'a> From<&'a ParseResult> for ParseReport<'a> {
    fn from(result: &'a ParseResult) -> Self {
        Self {
            raw: &result.raw,
            mode: &result.mode,
            command: result.command.as_ref().map(|c| c.name()),
            options: result.options.as_ref(),
            remainder: &result.remainder,
            errors: result.errors.iter().map(ToString::to_string).collect(),
        }
    }
}

/// What an echo handler prints.
#[derive(Debug, Serialize)]
struct Echo<'a> {
    handler: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a Record>,
    remainder: &'a [String],
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Command::Tokenize(args) => run_tokenize(args),
        Command::Regroup(args) => run_regroup(args),
        Command::Parse(args) => run_parse(args),
        Command::Run(args) => run_run(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        "optline_cli=debug,optline_core=debug,optline_engine=debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_tokenize(args: RawArgs) -> Result<(), String> {
    print_json(&tokenize(&args.raw.join(" ")))
}

fn run_regroup(args: RawArgs) -> Result<(), String> {
    print_json(&regroup_str(&args.raw.join(" ")))
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let catalog = load_catalog(&args.catalog.catalog)?;
    let options = load_options(args.catalog.options.as_deref())?;
    let handlers = echo_handlers(&catalog);
    let parser = optline_engine::Parser::from_provider(&catalog, &handlers, options)
        .map_err(|err| format!("Failed to build commands: {err}"))?;

    let result = parser.parse(&args.raw.raw.join(" "));
    let report = ParseReport::from(&result);
    match args.format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Yaml => {
            let text = serde_yaml::to_string(&report)
                .map_err(|err| format!("Failed to serialize parse result: {err}"))?;
            print!("{text}");
            Ok(())
        }
    }
}

fn run_run(args: RunArgs) -> Result<(), String> {
    let catalog = load_catalog(&args.catalog.catalog)?;
    let options = load_options(args.catalog.options.as_deref())?;
    let handlers = echo_handlers(&catalog);
    let parser = optline_engine::Parser::from_provider(&catalog, &handlers, options)
        .map_err(|err| format!("Failed to build commands: {err}"))?;

    let raw = args.raw.raw.join(" ");
    let mut dispatcher = Dispatcher::new(&parser, PlainPresenter::stdout());
    let execution = dispatcher
        .parse_and_run(&raw)
        .map_err(|err| err.to_string())?;
    debug!(?execution, "Dispatched command line");

    match execution {
        Execution::ReportedErrors => Err("the command line has errors".to_string()),
        _ => Ok(()),
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let catalog = load_catalog(&args.catalog)?;

    let mut problems: Vec<String> = validate_catalog(&catalog)
        .iter()
        .map(ToString::to_string)
        .collect();
    if problems.is_empty() {
        let handlers = echo_handlers(&catalog);
        if let Err(err) = CommandRegistry::build(&catalog, &handlers, &ParserOptions::standard()) {
            problems.push(err.to_string());
        }
    }

    if problems.is_empty() {
        println!(
            "Validated {} command(s) and {} option type(s).",
            catalog.commands().len(),
            catalog.option_types.len()
        );
        return Ok(());
    }

    for problem in &problems {
        eprintln!("  {problem}");
    }
    Err(format!("{} problem(s) found in '{}'", problems.len(), args.catalog.display()))
}

fn load_catalog(path: &Path) -> Result<Catalog, String> {
    Catalog::load(path).map_err(|err| format!("Failed to load '{}': {err}", path.display()))
}

fn load_options(path: Option<&Path>) -> Result<ParserOptions, String> {
    match path {
        Some(path) => ParserOptions::load(path)
            .map_err(|err| format!("Failed to load '{}': {err}", path.display())),
        None => Ok(ParserOptions::standard()),
    }
}

/// One echo handler per handler key, shaped to match its commands.
fn echo_handlers(catalog: &Catalog) -> HandlerTable {
    let mut handlers = HandlerTable::new();
    for command in catalog.commands() {
        let key = command.handler_key().to_string();
        let handler = if command.options.is_some() {
            Handler::with_options(move |options, rest| echo(&key, Some(options), rest))
        } else {
            Handler::run(move |rest| echo(&key, None, rest))
        };
        handlers.insert(command.handler_key(), handler);
    }
    handlers
}

fn echo(handler: &str, options: Option<&Record>, rest: &[String]) -> optline_engine::HandlerResult {
    let echo = Echo {
        handler,
        options,
        remainder: rest,
    };
    println!("{}", serde_json::to_string(&echo)?);
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    println!("{text}");
    Ok(())
}
