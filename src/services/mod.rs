pub mod generation;
pub mod prompt;
pub mod providers;
pub mod recommendations;

pub use providers::{CompletionProvider, OpenAiProvider, TextStream};
