//! Nested command groups.
//!
//! A [`CommandGroup`] is a handler that owns a second parser. When its parent
//! command runs, the group parses the parent's remainder against its own
//! registry and dispatches the result, so `tool remote add -name x` can route
//! `add -name x` to a subcommand.

use std::rc::Rc;

use optline_core::MetadataProvider;
use tracing::debug;

use crate::config::ParserOptions;
use crate::dispatch::Dispatcher;
use crate::engine::Parser;
use crate::handler::{Handler, HandlerResult, HandlerTable};
use crate::presenter::PlainPresenter;
use crate::registry::RegistryError;

/// A handler that re-parses its remainder against a nested registry.
///
/// # Examples
///
/// ```
/// use optline_core::{Catalog, CommandDescriptor};
/// use optline_engine::{CommandGroup, Handler, HandlerTable};
///
/// let nested = Catalog::new()
///     .with_command(CommandDescriptor::new("add"))
///     .with_command(CommandDescriptor::new("remove"));
/// let handlers = HandlerTable::new()
///     .with("add", Handler::run(|_| Ok(())))
///     .with("remove", Handler::run(|_| Ok(())));
///
/// let group = CommandGroup::new(&nested, &handlers, None)
///     .unwrap()
///     .with_default_argument("add");
/// assert!(group.parser().options().require_strict_command_name);
///
/// // Registered as the handler of a parent command.
/// let handler = group.into_handler();
/// assert!(handler.is_async());
/// ```
#[derive(Clone)]
pub struct CommandGroup {
    parser: Rc<Parser>,
    default_argument: Option<String>,
}

impl CommandGroup {
    /// Options used when a group is built without explicit ones.
    pub fn default_options() -> ParserOptions {
        ParserOptions {
            require_strict_command_name: true,
            require_strict_option_name: true,
            do_not_display_usage: true,
            display_command_list_as_help: true,
            ..ParserOptions::default()
        }
    }

    pub fn new(
        provider: &dyn MetadataProvider,
        handlers: &HandlerTable,
        options: Option<ParserOptions>,
    ) -> Result<Self, RegistryError> {
        let options = options.unwrap_or_else(Self::default_options);
        let parser = Parser::from_provider(provider, handlers, options)?;
        Ok(Self::from_parser(parser))
    }

    pub fn from_parser(parser: Parser) -> Self {
        Self {
            parser: Rc::new(parser),
            default_argument: None,
        }
    }

    /// Command line used when the group is invoked with no arguments.
    pub fn with_default_argument(mut self, argument: &str) -> Self {
        self.default_argument = Some(argument.to_string());
        self
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// Parses `args` against the nested registry and dispatches the result.
    ///
    /// Help and errors are written to stdout.
    pub async fn run(&self, args: &[String]) -> HandlerResult {
        let raw = match &self.default_argument {
            Some(default) if args.is_empty() => default.clone(),
            _ => args.join(" "),
        };
        debug!(raw = %raw, "Dispatching command group");

        let mut dispatcher = Dispatcher::new(&self.parser, PlainPresenter::stdout());
        dispatcher
            .parse_and_run_async(&raw)
            .await
            .map(|_| ())
            .map_err(|e| e.into_handler_error())
    }

    /// Wraps the group as an asynchronous handler for a parent command.
    pub fn into_handler(self) -> Handler {
        Handler::run_async(move |rest| {
            let group = self.clone();
            async move { group.run(&rest).await }
        })
    }
}
