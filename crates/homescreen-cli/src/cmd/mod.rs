pub mod enrich;
pub mod prompts;
pub mod snapshot;
