//! Terminal prompt for confirmations.

#[cfg(feature = "interactive")]
use std::io::IsTerminal;

use devhost_adapters::StdinPrompt;
use devhost_core::application::ports::Prompt;

/// The prompt the executor asks through: line editing on a terminal,
/// plain stdin otherwise.
pub fn terminal_prompt() -> Box<dyn Prompt> {
    #[cfg(feature = "interactive")]
    if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
        return Box::new(interactive::DialoguerPrompt);
    }
    Box::new(StdinPrompt)
}

#[cfg(feature = "interactive")]
mod interactive {
    use dialoguer::Input;

    use devhost_core::{
        application::{ApplicationError, ports::Prompt},
        error::DevhostResult,
    };

    pub struct DialoguerPrompt;

    impl Prompt for DialoguerPrompt {
        fn ask(&self, question: &str) -> DevhostResult<String> {
            Input::<String>::new()
                .with_prompt(question)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| ApplicationError::Cancelled(e.to_string()).into())
        }
    }
}
