// The core: mode registry + rewrite engine.
// All LLM calls go through llm_client — no direct OpenAI calls here.

pub mod handlers;
pub mod modes;
pub mod prompts;
pub mod rewrite;
