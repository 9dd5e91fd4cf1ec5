//! Nested command group example.
//!
//! Builds a `remote` command whose handler is a `CommandGroup` with its own
//! `add`/`remove`/`list` commands, plus an asynchronous `fetch` command, and
//! drives everything with `Dispatcher::run_async`.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p optline-demos --example command_groups
//! ```

use futures::executor::block_on;
use optline_core::{Catalog, CommandDescriptor, FieldDescriptor, OptionTypeDescriptor};
use optline_engine::{
    CommandGroup, Dispatcher, Handler, HandlerTable, Parser, ParserOptions, PlainPresenter,
};

fn remote_group() -> CommandGroup {
    let catalog = Catalog::new()
        .with_option_type(
            OptionTypeDescriptor::new("AddOptions")
                .with_field(FieldDescriptor::new("name", "string").required())
                .with_field(FieldDescriptor::new("url", "string").required()),
        )
        .with_command(
            CommandDescriptor::new("add")
                .with_description("Add a remote")
                .with_options("AddOptions"),
        )
        .with_command(CommandDescriptor::new("remove").with_description("Remove a remote"))
        .with_command(CommandDescriptor::new("list").with_description("List remotes"));

    let handlers = HandlerTable::new()
        .with(
            "add",
            Handler::with_options(|options, _| {
                println!("added remote {options}");
                Ok(())
            }),
        )
        .with(
            "remove",
            Handler::run(|rest| {
                println!("removed {rest:?}");
                Ok(())
            }),
        )
        .with(
            "list",
            Handler::run(|_| {
                println!("origin\nupstream");
                Ok(())
            }),
        );

    CommandGroup::new(&catalog, &handlers, None)
        .unwrap()
        .with_default_argument("list")
}

fn main() {
    let catalog = Catalog::new()
        .with_option_type(
            OptionTypeDescriptor::new("FetchOptions")
                .with_field(FieldDescriptor::new("remote", "string").with_default("origin"))
                .with_field(FieldDescriptor::new("depth", "u32").with_short("d")),
        )
        .with_command(
            CommandDescriptor::new("remote")
                .with_description("Manage remotes")
                .as_subcommand(),
        )
        .with_command(
            CommandDescriptor::new("fetch")
                .with_description("Fetch from a remote")
                .with_options("FetchOptions"),
        );

    let handlers = HandlerTable::new()
        .with("remote", remote_group().into_handler())
        .with(
            "fetch",
            Handler::async_with_options(|options, _| async move {
                let remote: String = options.get_as("remote").unwrap_or_default();
                let depth: u32 = options.get_as("depth").unwrap_or_default();
                println!("fetching {remote} (depth {depth})");
                Ok(())
            }),
        );

    let options = ParserOptions::strict_command_name().with_program_name("vcs");
    let parser = Parser::from_provider(&catalog, &handlers, options).unwrap();
    let mut dispatcher = Dispatcher::new(&parser, PlainPresenter::stdout());

    block_on(async {
        for line in [
            "remote add upstream https://example.com/repo.git",
            "remote",
            "remote remove origin",
            "remote bogus",
            "fetch -d 10",
            "help",
        ] {
            println!("$ vcs {line}");
            match dispatcher.parse_and_run_async(line).await {
                Ok(execution) => println!("=> {execution:?}\n"),
                Err(err) => println!("=> failed: {err}\n"),
            }
        }
    });
}
