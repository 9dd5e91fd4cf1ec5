//! Command resolution, parsing and dispatch.
//!
//! Built on the schemas and binder of `optline_core`:
//!
//! - [`CommandRegistry`]: commands by name and alias, with the default
//!   command and each command's compiled option schema and [`Handler`].
//! - [`Parser`]: resolves a command line to help, the version, or a bound
//!   command ([`ParseResult`]).
//! - [`Dispatcher`]: runs the bound handler, or renders help and errors
//!   through a [`Presenter`].
//! - [`CommandGroup`]: a handler that dispatches its remainder against a
//!   nested registry.
//!
//! Parser behavior is configured with [`ParserOptions`], which can also be
//! loaded from YAML.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use optline_core::{Catalog, CommandDescriptor, FieldDescriptor, OptionTypeDescriptor};
//! use optline_engine::*;
//!
//! let catalog = Catalog::new()
//!     .with_option_type(
//!         OptionTypeDescriptor::new("AddOptions")
//!             .with_field(FieldDescriptor::new("value", "i32").required())
//!             .with_field(FieldDescriptor::new("times", "u8").with_short("t").with_default("1")),
//!     )
//!     .with_command(CommandDescriptor::new("add").with_options("AddOptions"));
//!
//! let total = Rc::new(Cell::new(0));
//! let sum = total.clone();
//! let handlers = HandlerTable::new().with(
//!     "add",
//!     Handler::with_options(move |options, _| {
//!         let value: i32 = options.get_as("value").unwrap_or_default();
//!         let times: u8 = options.get_as("times").unwrap_or_default();
//!         sum.set(sum.get() + value * i32::from(times));
//!         Ok(())
//!     }),
//! );
//!
//! let parser = Parser::from_provider(&catalog, &handlers, ParserOptions::standard()).unwrap();
//! let mut dispatcher = Dispatcher::new(&parser, PlainPresenter::new(Vec::new()));
//!
//! assert_eq!(dispatcher.parse_and_run("add 5 -t 3").unwrap(), Execution::Ran);
//! assert_eq!(total.get(), 15);
//! ```

mod config;
mod dispatch;
mod engine;
mod group;
mod handler;
mod presenter;
mod registry;

pub use config::{DEFAULT_VERSION, ParserOptions};
pub use dispatch::{DispatchError, Dispatcher, Execution};
pub use engine::{ParseMode, ParseResult, Parser};
pub use group::CommandGroup;
pub use handler::{Handler, HandlerError, HandlerResult, HandlerTable};
pub use presenter::{HelpRequest, PlainPresenter, Presenter};
pub use registry::{Command, CommandRegistry, RegistryError};
