//! Command handlers.
//!
//! A command's behavior is one of four call shapes, fixed when the handler is
//! created: synchronous or asynchronous, with or without the bound option
//! record. The registry checks the shape against the command's option type
//! once, so dispatch never inspects types.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use optline_core::{FromRecord, Record};

/// Error returned by a handler; surfaced to the caller unchanged.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// Result of running a handler.
pub type HandlerResult = Result<(), HandlerError>;

type RunFn = dyn Fn(&[String]) -> HandlerResult;
type RunWithOptionsFn = dyn Fn(&Record, &[String]) -> HandlerResult;
type RunAsyncFn = dyn Fn(Vec<String>) -> LocalBoxFuture<'static, HandlerResult>;
type RunAsyncWithOptionsFn = dyn Fn(Record, Vec<String>) -> LocalBoxFuture<'static, HandlerResult>;

/// A command handler in one of the four call shapes.
///
/// # Examples
///
/// ```
/// use optline_engine::Handler;
///
/// let handler = Handler::with_options(|options, rest| {
///     println!("{options} {rest:?}");
///     Ok(())
/// });
/// assert!(handler.takes_options());
/// assert!(!handler.is_async());
/// ```
#[derive(Clone)]
pub enum Handler {
    /// Receives the positional remainder.
    Run(Rc<RunFn>),
    /// Receives the bound options and the remainder.
    RunWithOptions(Rc<RunWithOptionsFn>),
    /// Asynchronous form of [`Handler::Run`].
    RunAsync(Rc<RunAsyncFn>),
    /// Asynchronous form of [`Handler::RunWithOptions`].
    RunAsyncWithOptions(Rc<RunAsyncWithOptionsFn>),
}

impl Handler {
    pub fn run(f: impl Fn(&[String]) -> HandlerResult + 'static) -> Self {
        Handler::Run(Rc::new(f))
    }

    pub fn with_options(f: impl Fn(&Record, &[String]) -> HandlerResult + 'static) -> Self {
        Handler::RunWithOptions(Rc::new(f))
    }

    pub fn run_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<String>) -> Fut + 'static,
        Fut: Future<Output = HandlerResult> + 'static,
    {
        Handler::RunAsync(Rc::new(move |rest| f(rest).boxed_local()))
    }

    pub fn async_with_options<F, Fut>(f: F) -> Self
    where
        F: Fn(Record, Vec<String>) -> Fut + 'static,
        Fut: Future<Output = HandlerResult> + 'static,
    {
        Handler::RunAsyncWithOptions(Rc::new(move |options, rest| f(options, rest).boxed_local()))
    }

    /// Wraps a handler that takes a host option struct.
    ///
    /// The record is converted with [`FromRecord`]; a record that does not
    /// convert fails the call with an error naming the option type.
    pub fn typed<T, F>(f: F) -> Self
    where
        T: FromRecord,
        F: Fn(T, &[String]) -> HandlerResult + 'static,
    {
        Handler::with_options(move |record, rest| match T::from_record(record) {
            Some(options) => f(options, rest),
            None => Err(format!(
                "bound options do not match the handler's type ({})",
                record.type_name().unwrap_or("untyped")
            )
            .into()),
        })
    }

    pub fn takes_options(&self) -> bool {
        matches!(self, Handler::RunWithOptions(_) | Handler::RunAsyncWithOptions(_))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Handler::RunAsync(_) | Handler::RunAsyncWithOptions(_))
    }

    fn shape(&self) -> &'static str {
        match self {
            Handler::Run(_) => "Run",
            Handler::RunWithOptions(_) => "RunWithOptions",
            Handler::RunAsync(_) => "RunAsync",
            Handler::RunAsyncWithOptions(_) => "RunAsyncWithOptions",
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler::{}", self.shape())
    }
}

/// Handlers keyed by the names commands refer to.
///
/// # Examples
///
/// ```
/// use optline_engine::{Handler, HandlerTable};
///
/// let table = HandlerTable::new()
///     .with("list", Handler::run(|_| Ok(())))
///     .with(" copy ", Handler::run(|_| Ok(())));
/// assert!(table.get("copy").is_some());
/// assert!(table.get("move").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct HandlerTable {
    handlers: HashMap<String, Handler>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler, replacing any previous one under the same key.
    pub fn insert(&mut self, key: &str, handler: Handler) {
        self.handlers.insert(key.trim().to_string(), handler);
    }

    pub fn with(mut self, key: &str, handler: Handler) -> Self {
        self.insert(key, handler);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Handler> {
        self.handlers.get(key.trim())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
