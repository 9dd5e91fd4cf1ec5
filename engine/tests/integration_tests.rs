use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use optline_core::{
    ArgumentError, Catalog, CommandDescriptor, FieldDescriptor, OptionTypeDescriptor, ParseError,
};
use optline_engine::{
    CommandGroup, CommandRegistry, Dispatcher, Execution, Handler, HandlerTable, ParseMode,
    Parser, ParserOptions, PlainPresenter,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Calls = Rc<RefCell<Vec<String>>>;

fn recorder(calls: &Calls, name: &str) -> Handler {
    let calls = calls.clone();
    let name = name.to_string();
    Handler::with_options(move |options, rest| {
        calls.borrow_mut().push(format!("{name} {options} {rest:?}"));
        Ok(())
    })
}

fn plain(calls: &Calls, name: &str) -> Handler {
    let calls = calls.clone();
    let name = name.to_string();
    Handler::run(move |rest| {
        calls.borrow_mut().push(format!("{name} {rest:?}"));
        Ok(())
    })
}

fn catalog() -> Catalog {
    Catalog::new()
        .with_option_type(
            OptionTypeDescriptor::new("TestOptions")
                .with_field(FieldDescriptor::new("n", "i32").with_default("0"))
                .with_field(FieldDescriptor::new("text", "string").with_short("t")),
        )
        .with_command(CommandDescriptor::new("test").with_options("TestOptions"))
        .with_command(CommandDescriptor::new("list-files"))
        .with_command(CommandDescriptor::new("load-file"))
}

fn handlers(calls: &Calls) -> HandlerTable {
    HandlerTable::new()
        .with("test", recorder(calls, "test"))
        .with("list-files", plain(calls, "list-files"))
        .with("load-file", plain(calls, "load-file"))
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn test_auto_alias_collision_keeps_first() {
    let calls = Calls::default();
    let options = ParserOptions {
        auto_alias: true,
        ..ParserOptions::standard()
    };
    let registry = CommandRegistry::build(&catalog(), &handlers(&calls), &options).unwrap();

    assert_eq!(registry.resolve("lf").unwrap().name(), "list-files");
    assert_eq!(registry.resolve("LF").unwrap().name(), "list-files");
    assert_eq!(registry.resolve("t").unwrap().name(), "test");
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_missing_handler_is_a_build_error() {
    let calls = Calls::default();
    let handlers = HandlerTable::new().with("test", recorder(&calls, "test"));
    let err = Parser::from_provider(&catalog(), &handlers, ParserOptions::standard()).unwrap_err();
    assert!(err.to_string().contains("list-files"));
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[test]
fn test_empty_input_in_strict_mode() {
    let calls = Calls::default();
    let parser =
        Parser::from_provider(&catalog(), &handlers(&calls), ParserOptions::strict_command_name())
            .unwrap();

    let result = parser.parse("");
    assert_eq!(result.mode, ParseMode::Failed { help: String::new() });
    assert_eq!(result.errors, [ArgumentError::from(ParseError::MissingCommand)]);
    assert_eq!(result.errors[0].to_string(), "Specify the command name");
}

#[test]
fn test_default_command_takes_leading_options() {
    let calls = Calls::default();
    let parser =
        Parser::from_provider(&catalog(), &handlers(&calls), ParserOptions::standard()).unwrap();

    let result = parser.parse("-n 99 -t \"a b\"");
    assert!(result.is_bound());
    assert_eq!(result.command.as_ref().unwrap().name(), "test");
    let options = result.options.unwrap();
    assert_eq!(options.get_as::<i32>("n"), Some(99));
    assert_eq!(options.get_as::<String>("text").as_deref(), Some("a b"));
}

#[test]
fn test_repeated_parses_do_not_leak() {
    let calls = Calls::default();
    let parser =
        Parser::from_provider(&catalog(), &handlers(&calls), ParserOptions::standard()).unwrap();

    let first = parser.parse("test -n 5").options.unwrap();
    let second = parser.parse("test").options.unwrap();
    assert_eq!(first.get_as::<i32>("n"), Some(5));
    assert_eq!(second.get_as::<i32>("n"), Some(0));
}

#[test]
fn test_batch_parses_each_group() {
    let calls = Calls::default();
    let parser =
        Parser::from_provider(&catalog(), &handlers(&calls), ParserOptions::standard()).unwrap();

    let results = parser.parse_batch("test -n 1 | list-files a | test -n x");
    let modes: Vec<_> = results.iter().map(|r| r.mode.clone()).collect();
    assert_eq!(
        modes,
        [
            ParseMode::Bound,
            ParseMode::Bound,
            ParseMode::Failed {
                help: "test".into()
            }
        ]
    );
}

#[test]
fn test_env_backed_option_through_parser() {
    let catalog = Catalog::new()
        .with_option_type(
            OptionTypeDescriptor::new("LoginOptions").with_field(
                FieldDescriptor::new("user", "string")
                    .with_short("u")
                    .required()
                    .from_env(),
            ),
        )
        .with_command(CommandDescriptor::new("login").with_options("LoginOptions"));
    let calls = Calls::default();
    let handlers = HandlerTable::new().with("login", recorder(&calls, "login"));
    let parser = Parser::from_provider(&catalog, &handlers, ParserOptions::standard())
        .unwrap()
        .with_env(HashMap::from([("u".to_string(), "ada".to_string())]));

    let result = parser.parse("login");
    assert!(result.is_bound());
    assert_eq!(
        result.options.unwrap().get_as::<String>("user").as_deref(),
        Some("ada")
    );
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn test_help_for_command_runs_nothing() {
    let calls = Calls::default();
    let parser = Parser::from_provider(
        &catalog(),
        &handlers(&calls),
        ParserOptions::standard().with_program_name("tool"),
    )
    .unwrap();
    let mut dispatcher = Dispatcher::new(&parser, PlainPresenter::new(Vec::new()));

    assert_eq!(parser.parse("help test").mode, ParseMode::Help("test".into()));
    assert_eq!(dispatcher.parse_and_run("help test").unwrap(), Execution::ShowedHelp);
    assert_eq!(dispatcher.parse_and_run("test help").unwrap(), Execution::ShowedHelp);
    assert!(calls.borrow().is_empty());

    let output = String::from_utf8(dispatcher.into_presenter().into_inner()).unwrap();
    assert!(output.starts_with("Usage: tool test -option value...\n"));
    assert!(output.contains("  -text, -t <string>     (Optional)\n"));
}

#[test]
fn test_failed_parse_reports_errors() {
    let calls = Calls::default();
    let parser = Parser::from_provider(
        &catalog(),
        &handlers(&calls),
        ParserOptions::strict_option_name().with_program_name("tool"),
    )
    .unwrap();
    let mut dispatcher = Dispatcher::new(&parser, PlainPresenter::new(Vec::new()));

    let execution = dispatcher.parse_and_run("test -bogus 1").unwrap();
    assert_eq!(execution, Execution::ReportedErrors);
    assert!(calls.borrow().is_empty());

    let output = String::from_utf8(dispatcher.into_presenter().into_inner()).unwrap();
    assert!(output.starts_with(
        "Error: test -bogus 1\n  Option 'bogus' is not found in Type: TestOptions\n\n"
    ));
}

#[test]
fn test_nested_group_dispatch() {
    let calls = Calls::default();
    let nested = Catalog::new()
        .with_command(CommandDescriptor::new("add"))
        .with_command(CommandDescriptor::new("remove"));
    let nested_handlers = HandlerTable::new()
        .with("add", plain(&calls, "add"))
        .with("remove", plain(&calls, "remove"));
    let group = CommandGroup::new(&nested, &nested_handlers, None).unwrap();

    let catalog = Catalog::new().with_command(CommandDescriptor::new("remote").as_subcommand());
    let handlers = HandlerTable::new().with("remote", group.into_handler());
    let parser =
        Parser::from_provider(&catalog, &handlers, ParserOptions::strict_command_name()).unwrap();
    let mut dispatcher = Dispatcher::new(&parser, PlainPresenter::new(Vec::new()));

    assert_eq!(dispatcher.parse_and_run("remote add origin").unwrap(), Execution::Ran);
    assert_eq!(dispatcher.parse_and_run("remote remove x").unwrap(), Execution::Ran);
    // Groups use strict option names, so the nested parse fails and reports.
    assert_eq!(dispatcher.parse_and_run("remote remove -f x").unwrap(), Execution::Ran);
    assert_eq!(*calls.borrow(), ["add [\"origin\"]", "remove [\"x\"]"]);
}
