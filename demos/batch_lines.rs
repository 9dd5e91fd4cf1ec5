//! Batch command line example.
//!
//! Shows the helpers around the parser: stripping the program path from a
//! full command line, pulling a global argument out before parsing, parsing
//! `|`-separated groups independently, and re-binding a settings string on
//! top of an existing record with `try_parse_options`.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p optline-demos --example batch_lines
//! ```

use optline_core::{
    Catalog, CommandDescriptor, FieldDescriptor, OptionTypeDescriptor, SchemaBuilder, peek_command,
    regroup_str, strip_program_path, tokenize, try_get_and_remove_argument, try_parse_options,
};
use optline_engine::{Handler, HandlerTable, ParseMode, Parser, ParserOptions};

fn main() {
    let catalog = Catalog::new()
        .with_option_type(
            OptionTypeDescriptor::new("StepOptions")
                .with_field(FieldDescriptor::new("A", "i32").with_default("0"))
                .with_field(FieldDescriptor::new("B", "i32").with_default("0"))
                .with_field(FieldDescriptor::new("label", "string").with_default("step")),
        )
        .with_command(CommandDescriptor::new("step").with_options("StepOptions"));
    let handlers = HandlerTable::new().with("step", Handler::with_options(|_, _| Ok(())));
    let parser = Parser::from_provider(&catalog, &handlers, ParserOptions::standard()).unwrap();

    // A full process command line, as some platforms report it.
    let full = "\"/opt/batch tool/batch\" -profile ci step -A 1 | -B 2 | step -label \"last one\"";
    let line = strip_program_path(full);
    println!("command line: {line}");
    println!("first command: {:?}", peek_command(line));

    let mut args = tokenize(line);
    let profile = try_get_and_remove_argument(&mut args, "profile");
    println!("profile: {profile:?}");

    let rest = args.join(" ");
    println!("groups: {:?}", regroup_str(&rest));

    for result in parser.parse_batch(&rest) {
        match (&result.mode, &result.options) {
            (ParseMode::Bound, Some(options)) => println!("  {:<22} -> {options}", result.raw),
            _ => println!("  {:<22} -> {:?}", result.raw, result.mode),
        }
    }

    // Re-bind stored settings over an existing record.
    let schema = SchemaBuilder::new(&catalog).build("StepOptions").unwrap();
    let base = try_parse_options(&schema, "-A 10 -label saved", None).unwrap();
    let merged = try_parse_options(&schema, "-B 20 -unknown x", Some(base)).unwrap();
    println!("merged settings: {}", serde_json::to_string(&merged).unwrap());
}
