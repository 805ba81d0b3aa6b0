//! Language model collaborators

mod completion;

pub use completion::{CompletionClient, HttpCompletionClient};
