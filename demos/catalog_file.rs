//! Catalog file example.
//!
//! Writes a YAML catalog and a parser options file, loads both back,
//! validates the catalog, and parses pre-split arguments against it.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p optline-demos --example catalog_file
//! ```

use optline_core::{Catalog, MetadataProvider, validate_catalog};
use optline_engine::{Handler, HandlerTable, Parser, ParserOptions};

const CATALOG: &str = r#"
name: server
description: A tiny service launcher
enums:
  - name: LogLevel
    variants: [Error, Warn, Info, Debug]
option_types:
  - name: Tls
    fields:
      - long_name: cert
        kind: string
        default: "server.pem"
      - long_name: strict
        kind: bool
  - name: ServeOptions
    fields:
      - long_name: port
        short_name: p
        kind: u16
        required: true
        description: Port to listen on
      - long_name: log
        kind: LogLevel
        default: Info
      - long_name: token
        kind: string
        env: true
        description: API token (also read from the environment)
      - long_name: tls
        kind: Tls
commands:
  - name: serve
    default: true
    description: Start the service
    options: ServeOptions
  - name: check
    description: Check the configuration
"#;

fn main() {
    let dir = std::env::temp_dir().join("optline_catalog_example");
    std::fs::create_dir_all(&dir).unwrap();

    let catalog_path = dir.join("catalog.yaml");
    std::fs::write(&catalog_path, CATALOG).unwrap();
    let catalog = Catalog::load(&catalog_path).unwrap();

    let problems = validate_catalog(&catalog);
    println!(
        "{}: {} command(s), {} problem(s)",
        catalog.name.as_deref().unwrap_or("catalog"),
        catalog.commands().len(),
        problems.len()
    );

    let options_path = dir.join("options.yaml");
    ParserOptions::strict_option_name()
        .with_version("2.4.0")
        .save(&options_path)
        .unwrap();
    let options = ParserOptions::load(&options_path).unwrap();
    println!("options: {options:?}");

    let handlers = HandlerTable::new()
        .with("serve", Handler::with_options(|_, _| Ok(())))
        .with("check", Handler::run(|_| Ok(())));
    let parser = Parser::from_provider(&catalog, &handlers, options).unwrap();

    let args = ["-p", "8443", "-tls", "{-strict true}", "-log", "debug"];
    let result = parser.parse_args(&args);
    println!("{:?}", result.mode);
    if let Some(bound) = &result.options {
        println!("{}", serde_json::to_string_pretty(bound).unwrap());
    }

    let result = parser.parse_args(&["serve", "-port", "80", "-verbose"]);
    for error in &result.errors {
        println!("error: {error}");
    }

    std::fs::remove_dir_all(&dir).ok();
}
