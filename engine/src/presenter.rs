//! Help, version and error output.

use std::io::{self, Write};
use std::sync::Arc;

use optline_core::{ArgumentError, FieldKind, OptionField, OptionSchema, ScalarKind, Value};

use crate::config::ParserOptions;
use crate::registry::{Command, CommandRegistry};

const INDENT: &str = "  ";
const GAP: &str = "    ";

/// Everything a presenter needs to render help.
#[derive(Debug, Clone, Copy)]
pub struct HelpRequest<'a> {
    /// The command line as given.
    pub raw: &'a str,
    /// Errors to report before the help text.
    pub errors: &'a [ArgumentError],
    /// Command to describe; empty for all commands.
    pub target: &'a str,
    pub registry: &'a CommandRegistry,
    pub options: &'a ParserOptions,
}

/// Renders informational output for the dispatcher.
pub trait Presenter {
    fn help(&mut self, request: &HelpRequest<'_>) -> io::Result<()>;

    fn version(&mut self, version: &str) -> io::Result<()>;
}

/// Plain-text presenter writing to any [`Write`] sink.
///
/// # Examples
///
/// ```
/// use optline_engine::{PlainPresenter, Presenter};
///
/// let mut presenter = PlainPresenter::new(Vec::new());
/// presenter.version("2.0.1").unwrap();
/// assert_eq!(String::from_utf8(presenter.into_inner()).unwrap(), "2.0.1\n");
/// ```
pub struct PlainPresenter<W: Write> {
    out: W,
}

impl PlainPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> PlainPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Renders a help request to a string.
    pub fn render(request: &HelpRequest<'_>) -> String {
        let mut text = String::new();

        if !request.errors.is_empty() {
            text.push_str(&format!("Error: {}\n", request.raw));
            for error in request.errors {
                text.push_str(&format!("{INDENT}{error}\n"));
            }
            text.push('\n');
        }

        if !request.options.do_not_display_usage {
            let target = if request.target.is_empty() {
                "<Command>"
            } else {
                request.target
            };
            text.push_str(&format!(
                "Usage: {} {target} -option value...\n\n",
                program_name(request.options)
            ));
        }

        if request.target.is_empty() && request.options.display_command_list_as_help {
            let mut names: Vec<&str> = request
                .registry
                .commands()
                .iter()
                .map(|c| c.name())
                .collect();
            names.sort_unstable();
            text.push_str(&names.join(" "));
            text.push('\n');
            return text;
        }

        let mut nested = Vec::new();
        match request.registry.find(request.target) {
            Some(command) if !request.target.is_empty() => {
                append_command(&mut text, command, &mut nested);
            }
            _ => {
                text.push_str("Commands:\n");
                for command in request.registry.commands() {
                    text.push_str(INDENT);
                    text.push_str(command.name());
                    if command.is_default() {
                        text.push_str(" (default)");
                    }
                    text.push('\n');
                }
                text.push('\n');
                for command in request.registry.commands() {
                    append_command(&mut text, command, &mut nested);
                }
            }
        }

        // Nested option types, each once, including types nested in them.
        let mut index = 0;
        while index < nested.len() {
            let schema = Arc::clone(&nested[index]);
            text.push_str(&format!("{{{}}}\n", schema.type_name().unwrap_or_default()));
            append_options(&mut text, &schema, &mut nested);
            index += 1;
        }

        text
    }
}

impl<W: Write> Presenter for PlainPresenter<W> {
    fn help(&mut self, request: &HelpRequest<'_>) -> io::Result<()> {
        writeln!(self.out, "{}", Self::render(request))?;
        self.out.flush()
    }

    fn version(&mut self, version: &str) -> io::Result<()> {
        writeln!(self.out, "{version}")?;
        self.out.flush()
    }
}

fn program_name(options: &ParserOptions) -> String {
    if let Some(name) = &options.program_name {
        return name.clone();
    }
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "app".to_string())
}

fn append_command(text: &mut String, command: &Command, nested: &mut Vec<Arc<OptionSchema>>) {
    let description = command.description().unwrap_or_default();
    if command.name().is_empty() {
        text.push_str(&format!("{description}\n"));
    } else {
        text.push_str(&format!("{}: {description}\n", command.name()));
    }
    append_options(text, command.schema(), nested);
}

fn append_options(text: &mut String, schema: &OptionSchema, nested: &mut Vec<Arc<OptionSchema>>) {
    if schema.is_empty() {
        text.push('\n');
        return;
    }

    let usages: Vec<String> = schema.fields().iter().map(OptionField::usage_text).collect();
    let width = usages.iter().map(|u| u.chars().count()).max().unwrap_or(0);

    for (field, usage) in schema.fields().iter().zip(&usages) {
        text.push_str(&format!(
            "{INDENT}{usage:<width$}{GAP}{}{}\n",
            field.description().unwrap_or_default(),
            default_note(field)
        ));

        if let Some(schema) = field.nested() {
            if !nested.iter().any(|s| s.type_name() == schema.type_name()) {
                nested.push(Arc::clone(schema));
            }
        }
    }
    text.push('\n');
}

fn default_note(field: &OptionField) -> String {
    let is_string = matches!(field.kind(), FieldKind::Scalar(ScalarKind::String));
    let quote = |text: &str| {
        if is_string {
            format!("\"{text}\"")
        } else {
            text.to_string()
        }
    };

    if field.is_required() {
        return match field.default_text() {
            Some(text) => format!(" (Required: {text})"),
            None => " (Required)".to_string(),
        };
    }
    if let Some(text) = field.default_text() {
        return format!(" (Default: {})", quote(text));
    }
    if let Some(value) = field.default_value() {
        return format!(" (Default: {})", quote(&value.to_string()));
    }

    match field.kind() {
        FieldKind::Nested(_) => String::new(),
        FieldKind::Scalar(ScalarKind::String) => " (Optional)".to_string(),
        FieldKind::Scalar(kind) => format!(" (Default: {})", kind.zero()),
        FieldKind::Enum(e) => match e.variants().first() {
            Some(first) => format!(" (Default: {})", Value::Enum(first.clone())),
            None => " (Optional)".to_string(),
        },
    }
}
