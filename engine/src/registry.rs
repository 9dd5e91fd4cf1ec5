//! Command registry.
//!
//! Resolves command names and aliases case-insensitively, compiles each
//! command's option schema once, wires commands to their handlers and picks
//! the default command.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::rc::Rc;
use std::sync::Arc;

use optline_core::{
    CommandDescriptor, ConstructionError, MetadataProvider, OptionSchema, SchemaBuilder,
    create_alias_from_command,
};
use thiserror::Error;
use tracing::debug;

use crate::config::ParserOptions;
use crate::handler::{Handler, HandlerTable};

/// Errors raised while building a [`CommandRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two different commands share a name.
    #[error("command name '{0}' already exists")]
    DuplicateCommand(String),
    /// An explicit alias is already taken.
    #[error("alias '{alias}' ({command}) already exists")]
    DuplicateAlias { alias: String, command: String },
    /// An option schema or handler could not be wired.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// A registered command.
#[derive(Debug)]
pub struct Command {
    name: String,
    alias: Option<String>,
    default: bool,
    subcommand: bool,
    description: Option<String>,
    handler_key: String,
    schema: Arc<OptionSchema>,
    handler: Handler,
}

impl Command {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit alias from the descriptor.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Whether this command was chosen (or declared) as default.
    pub fn is_default(&self) -> bool {
        self.default
    }

    /// Subcommands accept option names their schema does not know.
    pub fn is_subcommand(&self) -> bool {
        self.subcommand
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn handler_key(&self) -> &str {
        &self.handler_key
    }

    pub fn schema(&self) -> &Arc<OptionSchema> {
        &self.schema
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

/// Commands indexed by name and alias.
///
/// # Examples
///
/// ```
/// use optline_core::{Catalog, CommandDescriptor};
/// use optline_engine::{CommandRegistry, Handler, HandlerTable, ParserOptions};
///
/// let catalog = Catalog::new()
///     .with_command(CommandDescriptor::new("list-files"))
///     .with_command(CommandDescriptor::new("remove").with_alias("rm"));
/// let handlers = HandlerTable::new()
///     .with("list-files", Handler::run(|_| Ok(())))
///     .with("remove", Handler::run(|_| Ok(())));
///
/// let options = ParserOptions { auto_alias: true, ..ParserOptions::standard() };
/// let registry = CommandRegistry::build(&catalog, &handlers, &options).unwrap();
///
/// assert_eq!(registry.resolve("LF").unwrap().name(), "list-files");
/// assert_eq!(registry.resolve("rm").unwrap().name(), "remove");
/// assert_eq!(registry.default_command().unwrap().name(), "list-files");
/// ```
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Rc<Command>>,
    names: HashMap<String, usize>,
    aliases: HashMap<String, usize>,
    default: Option<usize>,
}

impl CommandRegistry {
    /// Builds the registry from every command the provider lists.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] for duplicate names or aliases, missing or
    /// mismatched handlers, and any schema construction failure.
    pub fn build(
        provider: &dyn MetadataProvider,
        handlers: &HandlerTable,
        options: &ParserOptions,
    ) -> Result<Self, RegistryError> {
        let mut schemas = SchemaBuilder::new(provider);
        let mut commands: Vec<Command> = Vec::new();
        let mut names = HashMap::new();
        let mut aliases = HashMap::new();
        let mut tentative: Option<usize> = None;

        for descriptor in provider.commands() {
            let name = descriptor.name.trim();
            let index = match names.entry(name.to_lowercase()) {
                Entry::Occupied(entry) => {
                    let index = *entry.get();
                    let existing: &Command = &commands[index];
                    if existing.handler_key != descriptor.handler_key() {
                        return Err(RegistryError::DuplicateCommand(name.to_string()));
                    }
                    debug!(command = name, "Skipped repeated command registration");
                    index
                }
                Entry::Vacant(entry) => {
                    let command = compile_command(descriptor, &mut schemas, handlers)?;
                    let index = commands.len();
                    tentative = match tentative {
                        None => Some(index),
                        Some(t) if !commands[t].default && command.default => Some(index),
                        keep => keep,
                    };
                    commands.push(command);
                    entry.insert(index);
                    index
                }
            };

            if let Some(alias) = descriptor.alias.as_deref().map(str::trim) {
                if !alias.is_empty() {
                    match aliases.entry(alias.to_lowercase()) {
                        Entry::Vacant(entry) => {
                            entry.insert(index);
                        }
                        Entry::Occupied(entry) if *entry.get() == index => {}
                        Entry::Occupied(_) => {
                            return Err(RegistryError::DuplicateAlias {
                                alias: alias.to_string(),
                                command: name.to_string(),
                            });
                        }
                    }
                }
            }
        }

        if options.auto_alias {
            for (index, command) in commands.iter().enumerate() {
                if command.alias.is_some() {
                    continue;
                }
                let alias = create_alias_from_command(&command.name).to_lowercase();
                if alias.is_empty() {
                    continue;
                }
                match aliases.entry(alias) {
                    Entry::Vacant(entry) => {
                        entry.insert(index);
                    }
                    Entry::Occupied(entry) => {
                        debug!(command = %command.name, alias = %entry.key(), "Generated alias already taken");
                    }
                }
            }
        }

        if let Some(index) = tentative {
            commands[index].default = true;
        }
        let default = if options.require_strict_command_name {
            None
        } else {
            tentative
        };

        debug!(
            commands = commands.len(),
            aliases = aliases.len(),
            default = ?default.map(|i| commands[i].name.as_str()),
            "Built command registry"
        );

        Ok(Self {
            commands: commands.into_iter().map(Rc::new).collect(),
            names,
            aliases,
            default,
        })
    }

    /// Commands in registration order.
    pub fn commands(&self) -> &[Rc<Command>] {
        &self.commands
    }

    /// Looks up a command by name only.
    pub fn find(&self, name: &str) -> Option<&Rc<Command>> {
        self.names
            .get(&name.to_lowercase())
            .map(|&i| &self.commands[i])
    }

    /// Looks up a command by alias only.
    pub fn find_alias(&self, alias: &str) -> Option<&Rc<Command>> {
        self.aliases
            .get(&alias.to_lowercase())
            .map(|&i| &self.commands[i])
    }

    /// Looks up a command by name, then by alias.
    pub fn resolve(&self, token: &str) -> Option<&Rc<Command>> {
        self.find(token).or_else(|| self.find_alias(token))
    }

    /// The command run when no command name is given.
    pub fn default_command(&self) -> Option<&Rc<Command>> {
        self.default.map(|i| &self.commands[i])
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn compile_command(
    descriptor: &CommandDescriptor,
    schemas: &mut SchemaBuilder<'_>,
    handlers: &HandlerTable,
) -> Result<Command, RegistryError> {
    let name = descriptor.name.trim();
    let handler_key = descriptor.handler_key();
    let schema = schemas.build_optional(descriptor.options.as_deref())?;

    let handler = handlers
        .get(handler_key)
        .cloned()
        .ok_or_else(|| ConstructionError::MissingHandler {
            command: name.to_string(),
            handler: handler_key.to_string(),
        })?;

    let mismatch = match (handler.takes_options(), schema.type_name()) {
        (true, None) => Some("takes options but the command declares no option type".to_string()),
        (false, Some(type_name)) => Some(format!("ignores the option type '{type_name}'")),
        _ => None,
    };
    if let Some(reason) = mismatch {
        return Err(ConstructionError::HandlerShapeMismatch {
            command: name.to_string(),
            handler: handler_key.to_string(),
            reason,
        }
        .into());
    }

    Ok(Command {
        name: name.to_string(),
        alias: descriptor
            .alias
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(String::from),
        default: descriptor.default || name.is_empty(),
        subcommand: descriptor.subcommand,
        description: descriptor.description.clone(),
        handler_key: handler_key.to_string(),
        schema,
        handler,
    })
}
