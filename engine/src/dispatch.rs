//! Acting on parse results.

use std::io;

use futures::executor::block_on;
use optline_core::Record;
use thiserror::Error;
use tracing::debug;

use crate::engine::{ParseMode, ParseResult, Parser};
use crate::handler::{Handler, HandlerError};
use crate::presenter::{HelpRequest, Presenter};

/// What a dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// The command's handler ran to completion.
    Ran,
    ShowedHelp,
    ShowedVersion,
    /// Errors were rendered and nothing ran.
    ReportedErrors,
}

/// Errors surfaced by a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The result claims to be bound but carries no command or options.
    #[error("parse result has no bound command")]
    NotBound,

    /// The handler failed; its error is passed through unchanged.
    #[error("{0}")]
    Handler(HandlerError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl DispatchError {
    /// Unwraps a handler error, boxing any other kind.
    pub fn into_handler_error(self) -> HandlerError {
        match self {
            DispatchError::Handler(inner) => inner,
            other => Box::new(other),
        }
    }
}

/// Runs handlers for parse results and renders everything else.
///
/// # Examples
///
/// ```
/// use optline_core::{Catalog, CommandDescriptor};
/// use optline_engine::{Dispatcher, Execution, Handler, HandlerTable, Parser, ParserOptions, PlainPresenter};
///
/// let catalog = Catalog::new().with_command(CommandDescriptor::new("ping"));
/// let handlers = HandlerTable::new().with("ping", Handler::run(|_| Ok(())));
/// let parser = Parser::from_provider(&catalog, &handlers, ParserOptions::standard()).unwrap();
///
/// let mut dispatcher = Dispatcher::new(&parser, PlainPresenter::new(Vec::new()));
/// assert_eq!(dispatcher.parse_and_run("ping").unwrap(), Execution::Ran);
/// assert_eq!(dispatcher.parse_and_run("version").unwrap(), Execution::ShowedVersion);
///
/// let output = dispatcher.into_presenter().into_inner();
/// assert_eq!(String::from_utf8(output).unwrap(), "1.0.0\n");
/// ```
pub struct Dispatcher<'a, P: Presenter> {
    parser: &'a Parser,
    presenter: P,
}

impl<'a, P: Presenter> Dispatcher<'a, P> {
    pub fn new(parser: &'a Parser, presenter: P) -> Self {
        Self { parser, presenter }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Acts on a result, blocking on asynchronous handlers.
    ///
    /// Must not be called from inside a future driven by
    /// [`block_on`]; use [`Dispatcher::run_async`] there.
    pub fn run(&mut self, result: &ParseResult) -> Result<Execution, DispatchError> {
        if let Some(execution) = self.present(result)? {
            return Ok(execution);
        }
        let (handler, options) = bound_parts(result)?;
        let rest = result.remainder.as_slice();

        let outcome = match handler {
            Handler::Run(f) => f(rest),
            Handler::RunWithOptions(f) => f(options.ok_or(DispatchError::NotBound)?, rest),
            Handler::RunAsync(f) => block_on(f(rest.to_vec())),
            Handler::RunAsyncWithOptions(f) => {
                let options = options.ok_or(DispatchError::NotBound)?.clone();
                block_on(f(options, rest.to_vec()))
            }
        };
        outcome.map_err(DispatchError::Handler)?;
        Ok(Execution::Ran)
    }

    /// Acts on a result, awaiting asynchronous handlers.
    pub async fn run_async(&mut self, result: &ParseResult) -> Result<Execution, DispatchError> {
        if let Some(execution) = self.present(result)? {
            return Ok(execution);
        }
        let (handler, options) = bound_parts(result)?;
        let rest = result.remainder.as_slice();

        let outcome = match handler {
            Handler::Run(f) => f(rest),
            Handler::RunWithOptions(f) => f(options.ok_or(DispatchError::NotBound)?, rest),
            Handler::RunAsync(f) => f(rest.to_vec()).await,
            Handler::RunAsyncWithOptions(f) => {
                let options = options.ok_or(DispatchError::NotBound)?.clone();
                f(options, rest.to_vec()).await
            }
        };
        outcome.map_err(DispatchError::Handler)?;
        Ok(Execution::Ran)
    }

    pub fn parse_and_run(&mut self, raw: &str) -> Result<Execution, DispatchError> {
        let result = self.parser.parse(raw);
        self.run(&result)
    }

    pub async fn parse_and_run_async(&mut self, raw: &str) -> Result<Execution, DispatchError> {
        let result = self.parser.parse(raw);
        self.run_async(&result).await
    }

    /// Renders help, version and errors; `None` means a handler should run.
    fn present(&mut self, result: &ParseResult) -> Result<Option<Execution>, DispatchError> {
        let execution = match &result.mode {
            ParseMode::Bound => return Ok(None),
            ParseMode::Version => {
                self.presenter.version(self.parser.options().version_text())?;
                Execution::ShowedVersion
            }
            ParseMode::Help(target) => {
                let request = self.help_request(result, target);
                self.presenter.help(&request)?;
                Execution::ShowedHelp
            }
            ParseMode::Failed { help } => {
                let request = self.help_request(result, help);
                self.presenter.help(&request)?;
                Execution::ReportedErrors
            }
        };
        debug!(raw = %result.raw, ?execution, "Presented parse result");
        Ok(Some(execution))
    }

    fn help_request<'r>(&self, result: &'r ParseResult, target: &'r str) -> HelpRequest<'r>
    where
        'a: 'r,
    {
        HelpRequest {
            raw: &result.raw,
            errors: &result.errors,
            target,
            registry: self.parser.registry(),
            options: self.parser.options(),
        }
    }
}

fn bound_parts(result: &ParseResult) -> Result<(&Handler, Option<&Record>), DispatchError> {
    let command = result.command.as_ref().ok_or(DispatchError::NotBound)?;
    debug!(
        command = command.name(),
        handler = ?command.handler(),
        remainder = result.remainder.len(),
        "Invoking handler"
    );
    Ok((command.handler(), result.options.as_ref()))
}
