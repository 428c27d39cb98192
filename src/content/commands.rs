//! Command registration and dispatch
//!
//! Commands live in a global-keyed registry: the key is the word a user types.
//! Host built-ins and module commands go through the same registration path,
//! the only difference being the owner id.

use crate::content::registry::ContentRegistry;
use crate::core::error_handling::{panic_message, BoxedError};
use crate::events::bus::EventBus;
use crate::events::lifecycle::CommandSent;
use crate::module::error::{ModuleError, ModuleResult};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

/// Lines of output produced by a command
pub type CommandOutput = Vec<String>;

/// Handler invoked with the arguments following the command name
pub type CommandHandler = Rc<dyn Fn(&[String]) -> Result<CommandOutput, BoxedError>>;

/// A registered command
#[derive(Clone)]
pub struct CommandDefinition {
    pub handler: CommandHandler,
    pub description: String,
    /// Whether the command is offered for tab completion
    pub autocomplete: bool,
}

impl CommandDefinition {
    pub fn new<F>(handler: F, description: impl Into<String>, autocomplete: bool) -> Self
    where
        F: Fn(&[String]) -> Result<CommandOutput, BoxedError> + 'static,
    {
        Self {
            handler: Rc::new(handler),
            description: description.into(),
            autocomplete,
        }
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("description", &self.description)
            .field("autocomplete", &self.autocomplete)
            .finish_non_exhaustive()
    }
}

/// Register a command under `name` for `owner`
pub fn register_command<F>(
    commands: &ContentRegistry<CommandDefinition>,
    owner: &str,
    name: &str,
    handler: F,
    description: &str,
    autocomplete: bool,
) -> ModuleResult<String>
where
    F: Fn(&[String]) -> Result<CommandOutput, BoxedError> + 'static,
{
    commands.register(
        owner,
        name,
        CommandDefinition::new(handler, description, autocomplete),
    )
}

/// Names offered for completion, sorted
pub fn autocomplete_names(commands: &ContentRegistry<CommandDefinition>) -> Vec<String> {
    commands
        .entries()
        .into_iter()
        .filter(|(_, entry)| entry.value.autocomplete)
        .map(|(key, _)| key)
        .collect()
}

/// Run a command line: `args[0]` is the command name
///
/// A `CommandSent` event is published first; if a listener cancels it the
/// handler is not run and the output is empty. Unknown commands are
/// `NotFound`; a failing or panicking handler is reported as an
/// `ActivationFailure` against the owning module.
pub fn execute(
    commands: &ContentRegistry<CommandDefinition>,
    events: &EventBus,
    args: &[String],
) -> ModuleResult<CommandOutput> {
    let Some(name) = args.first() else {
        return Err(ModuleError::not_found("empty command line"));
    };

    let entry = commands
        .entry(name)
        .ok_or_else(|| ModuleError::not_found(format!("command '{}'", name)))?;

    let mut event = CommandSent::new(args.to_vec());
    events.publish(&mut event);
    if event.cancelled {
        log::debug!("Command '{}' cancelled by a listener", name);
        return Ok(Vec::new());
    }

    let handler = entry.value.handler.clone();
    let arguments = event.args.get(1..).unwrap_or(&[]);
    match catch_unwind(AssertUnwindSafe(|| handler(arguments))) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(ModuleError::activation(
            entry.owner,
            format!("command '{}'", name),
            e.to_string(),
        )),
        Err(payload) => Err(ModuleError::activation(
            entry.owner,
            format!("command '{}'", name),
            format!("panicked: {}", panic_message(payload.as_ref())),
        )),
    }
}
