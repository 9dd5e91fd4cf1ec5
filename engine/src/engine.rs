//! Command-line resolution.
//!
//! [`Parser::parse`] decides what a command line asks for: help, the version,
//! or a command with bound options. It never runs anything; a
//! [`Dispatcher`](crate::Dispatcher) acts on the returned [`ParseResult`].

use std::rc::Rc;

use optline_core::{
    ArgumentError, Binder, EnvSource, MetadataProvider, ParseError, ProcessEnv, Record,
    is_option_reference, option_equals, regroup_str, tokenize,
};
use serde::Serialize;
use tracing::debug;

use crate::config::ParserOptions;
use crate::handler::HandlerTable;
use crate::registry::{Command, CommandRegistry, RegistryError};

const HELP: &str = "help";
const HELP_ALIAS: &str = "h";
const VERSION: &str = "version";

/// What a parsed command line resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "target", rename_all = "snake_case")]
pub enum ParseMode {
    /// Help was requested; the target is a command name, or empty for all commands.
    Help(String),
    /// The version was requested.
    Version,
    /// A command was resolved and its options bound.
    Bound,
    /// Errors occurred; `help` names the command to show help for, or is empty.
    Failed { help: String },
}

/// Outcome of one [`Parser::parse`] call.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The command line as given.
    pub raw: String,
    pub mode: ParseMode,
    /// Resolved command, when one was.
    pub command: Option<Rc<Command>>,
    /// Bound options; present only in [`ParseMode::Bound`].
    pub options: Option<Record>,
    /// Positional tokens left for the handler.
    pub remainder: Vec<String>,
    /// Errors in the order they were found.
    pub errors: Vec<ArgumentError>,
}

impl ParseResult {
    fn new(raw: &str, mode: ParseMode) -> Self {
        Self {
            raw: raw.to_string(),
            mode,
            command: None,
            options: None,
            remainder: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.mode == ParseMode::Bound
    }

    /// Command name help should describe (empty for all commands), if help is due.
    pub fn help_target(&self) -> Option<&str> {
        match &self.mode {
            ParseMode::Help(target) | ParseMode::Failed { help: target } => Some(target),
            _ => None,
        }
    }
}

/// Resolves command lines against a [`CommandRegistry`].
///
/// A parser is reusable: each call binds into a fresh record, so no state
/// leaks between calls.
///
/// # Examples
///
/// ```
/// use optline_core::{Catalog, CommandDescriptor, FieldDescriptor, OptionTypeDescriptor};
/// use optline_engine::{Handler, HandlerTable, ParseMode, Parser, ParserOptions};
///
/// let catalog = Catalog::new()
///     .with_option_type(
///         OptionTypeDescriptor::new("GreetOptions")
///             .with_field(FieldDescriptor::new("name", "string").required()),
///     )
///     .with_command(CommandDescriptor::new("greet").with_options("GreetOptions"));
/// let handlers = HandlerTable::new().with("greet", Handler::with_options(|_, _| Ok(())));
/// let parser = Parser::from_provider(&catalog, &handlers, ParserOptions::standard()).unwrap();
///
/// let result = parser.parse("greet -name Ada");
/// assert_eq!(result.mode, ParseMode::Bound);
/// assert_eq!(result.options.unwrap().get_as::<String>("name").as_deref(), Some("Ada"));
///
/// assert_eq!(parser.parse("help greet").mode, ParseMode::Help("greet".into()));
/// assert_eq!(parser.parse("-version").mode, ParseMode::Version);
/// ```
pub struct Parser {
    registry: CommandRegistry,
    options: ParserOptions,
    env: Box<dyn EnvSource>,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Parser {
    pub fn new(registry: CommandRegistry, options: ParserOptions) -> Self {
        Self {
            registry,
            options,
            env: Box::new(ProcessEnv),
        }
    }

    /// Builds the registry from a provider and wraps it in a parser.
    pub fn from_provider(
        provider: &dyn MetadataProvider,
        handlers: &HandlerTable,
        options: ParserOptions,
    ) -> Result<Self, RegistryError> {
        let registry = CommandRegistry::build(provider, handlers, &options)?;
        Ok(Self::new(registry, options))
    }

    /// Replaces the environment used for env-backed options.
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parses pre-split arguments by joining them with spaces.
    pub fn parse_args<S: AsRef<str>>(&self, args: &[S]) -> ParseResult {
        let raw = args
            .iter()
            .map(|a| a.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        self.parse(&raw)
    }

    /// Parses each `|`-separated group of `raw` independently.
    pub fn parse_batch(&self, raw: &str) -> Vec<ParseResult> {
        regroup_str(raw).iter().map(|group| self.parse(group)).collect()
    }

    /// Resolves one command line.
    pub fn parse(&self, raw: &str) -> ParseResult {
        let tokens = tokenize(raw);
        let mut command = self.registry.default_command();
        let mut specified = false;
        let mut start = 0;

        if let Some(first) = tokens.first() {
            let named = if is_option_reference(first) {
                None
            } else {
                self.registry.resolve(first)
            };

            match named {
                Some(found) => {
                    command = Some(found);
                    specified = true;
                    start = 1;
                }
                None => {
                    if let Some(mode) = self.help_or_version(&tokens) {
                        debug!(raw, mode = ?mode, "Resolved informational request");
                        return ParseResult::new(raw, mode);
                    }
                }
            }
        }

        let Some(command) = command else {
            let mut result = ParseResult::new(raw, ParseMode::Failed { help: String::new() });
            result.errors.push(ParseError::MissingCommand.into());
            return result;
        };

        if specified && !command.is_subcommand() {
            if let Some(next) = tokens.get(start) {
                // A schema with its own `help` field takes the word as input.
                if option_equals(next, HELP) && !command.schema().contains_name(HELP) {
                    return ParseResult::new(raw, ParseMode::Help(command.name().to_string()));
                }
            }
        }

        let binder = Binder::new(self.options.bind_settings(), self.env.as_ref());
        let outcome = binder.bind(command.schema(), &tokens, start, command.is_subcommand());

        let mode = if outcome.is_success() {
            ParseMode::Bound
        } else {
            let help = if specified {
                command.name().to_string()
            } else {
                String::new()
            };
            ParseMode::Failed { help }
        };
        debug!(raw, command = command.name(), mode = ?mode, "Parsed command line");

        ParseResult {
            raw: raw.to_string(),
            options: if mode == ParseMode::Bound {
                outcome.instance
            } else {
                None
            },
            mode,
            command: Some(Rc::clone(command)),
            remainder: outcome.remainder,
            errors: outcome.errors,
        }
    }

    /// Handles `help [command]` and `version` when the first token names no command.
    fn help_or_version(&self, tokens: &[String]) -> Option<ParseMode> {
        let first = tokens.first()?;
        let is_help =
            option_equals(first, HELP) || (self.options.auto_alias && option_equals(first, HELP_ALIAS));

        if is_help {
            let target = tokens
                .get(1)
                .filter(|t| !is_option_reference(t))
                .and_then(|t| self.registry.find(t))
                .map(|c| c.name().to_string())
                .unwrap_or_default();
            Some(ParseMode::Help(target))
        } else if option_equals(first, VERSION) {
            Some(ParseMode::Version)
        } else {
            None
        }
    }
}
