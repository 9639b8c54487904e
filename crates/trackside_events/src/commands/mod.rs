//! Chat commands: registration, tokenizing and dispatch.

mod command;
mod registry;
mod tokenizer;

pub use command::{ChatCommand, CommandContext, CommandHandler, CommandOptions, CommandTrigger};
pub use registry::{ChatCommandRegistry, CommandDispatch};
pub use tokenizer::{first_word, tokenize};
