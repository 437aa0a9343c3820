//! Planwright - LLM project plan generator
//!
//! Takes a free-text project description and a deadline, asks a generative
//! model for a phased plan, and serves the result over HTTP. Logged-in users
//! get every plan saved to a personal history.
//!
//! # Core Concepts
//!
//! - **Model chain**: a primary model and one fallback, each called at most once
//! - **Value-level failure**: generation returns a plan or an error, never both
//! - **Fence tolerant**: markdown-wrapped JSON is unwrapped before parsing
//!
//! # Modules
//!
//! - [`llm`] - LLM client trait with Gemini and OpenAI-compatible implementations
//! - [`prompts`] - Handlebars prompt templates
//! - [`plan`] - plan schema, fence extraction and the generator
//! - [`store`] - SQLite users, sessions and saved plans
//! - [`auth`] - password hashing and session cookies
//! - [`server`] - HTTP routes
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod auth;
pub mod cli;
pub mod config;
pub mod llm;
pub mod plan;
pub mod prompts;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::{AuthConfig, Config, LlmConfig, ServerConfig, StorageConfig};
pub use llm::{CompletionRequest, CompletionResponse, GeminiClient, LlmClient, LlmError, OpenAIClient, create_client};
pub use plan::{GeneratedPlan, Generation, GenerationError, PlanGenerator, extract_json_payload};
pub use prompts::PromptLoader;
pub use server::{ApiError, AppState, router};
pub use store::{HistoryEntry, Store, StoreError, User};
