// Prompt/Template Builder
// Turns the job description, extracted resume and structural summary into the
// single deterministic instruction sent through the generation gateway.

pub mod builder;
pub mod prompts;

pub use builder::{build_instruction, GenerationRequest};
