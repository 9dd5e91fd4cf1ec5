//! Typed handler example.
//!
//! Declares a small file-copy tool in code, converts bound records into a
//! host struct with `FromRecord`, and dispatches a few command lines,
//! including help and version requests.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p optline-demos --example typed_handlers
//! ```

use optline_core::{
    Catalog, CommandDescriptor, EnumDescriptor, FieldDescriptor, FromRecord,
    OptionTypeDescriptor, Record,
};
use optline_engine::{Dispatcher, Handler, HandlerTable, Parser, ParserOptions, PlainPresenter};

struct CopyOptions {
    source: String,
    target: String,
    mode: String,
    retries: u8,
}

impl FromRecord for CopyOptions {
    fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            source: record.get_as("source")?,
            target: record.get_as("target")?,
            mode: record.get_as("mode")?,
            retries: record.get_as("retries")?,
        })
    }
}

fn catalog() -> Catalog {
    Catalog::new()
        .with_enum(EnumDescriptor::new("CopyMode", &["Overwrite", "Skip", "Rename"]))
        .with_option_type(
            OptionTypeDescriptor::new("CopyOptions")
                .with_description("Options for copying files")
                .with_field(
                    FieldDescriptor::new("source", "string")
                        .with_short("s")
                        .with_description("File to copy")
                        .required(),
                )
                .with_field(
                    FieldDescriptor::new("target", "string")
                        .with_short("t")
                        .with_description("Destination path")
                        .required(),
                )
                .with_field(
                    FieldDescriptor::new("mode", "CopyMode")
                        .with_short("m")
                        .with_description("What to do when the target exists"),
                )
                .with_field(
                    FieldDescriptor::new("retries", "u8")
                        .with_description("Attempts before giving up")
                        .with_default("2"),
                ),
        )
        .with_command(
            CommandDescriptor::new("copy")
                .with_description("Copy a file")
                .with_options("CopyOptions")
                .as_default(),
        )
        .with_command(CommandDescriptor::new("list-files").with_description("List files"))
}

fn main() {
    let handlers = HandlerTable::new()
        .with(
            "copy",
            Handler::typed(|options: CopyOptions, rest| {
                println!(
                    "copy {} -> {} (mode {}, {} retries), extra: {rest:?}",
                    options.source, options.target, options.mode, options.retries
                );
                Ok(())
            }),
        )
        .with(
            "list-files",
            Handler::run(|rest| {
                println!("listing {rest:?}");
                Ok(())
            }),
        );

    let options = ParserOptions {
        auto_alias: true,
        ..ParserOptions::standard()
    }
    .with_program_name("copytool")
    .with_version("0.3.0");
    let parser = Parser::from_provider(&catalog(), &handlers, options).unwrap();
    let mut dispatcher = Dispatcher::new(&parser, PlainPresenter::stdout());

    for line in [
        "copy a.txt b.txt -m rename",
        "-s \"my notes.txt\" -t backup/ -retries 5 verbose",
        "lf /tmp",
        "copy help",
        "version",
        "copy -s only-source.txt",
    ] {
        println!("$ copytool {line}");
        match dispatcher.parse_and_run(line) {
            Ok(execution) => println!("=> {execution:?}\n"),
            Err(err) => println!("=> failed: {err}\n"),
        }
    }
}
