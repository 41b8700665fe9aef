//! # homehub core
//!
//! Domain types, traits, and error definitions for the household assistant.
//! This crate has **no framework dependencies**: it defines the model that
//! the provider, tool, agent and gateway crates implement against.
//!
//! ## Layout
//!
//! - [`message`]: content blocks, turns and the per-exchange [`Transcript`]
//! - [`tool`]: tool specs, the [`Tool`] trait and the read-only [`ToolRegistry`]
//! - [`provider`]: the completion client trait and [`CompletionOutcome`]
//! - [`sheet`] / [`weather`]: the collaborators the tools talk to
//! - [`error`]: the error taxonomy

pub mod error;
pub mod message;
pub mod provider;
pub mod sheet;
pub mod tool;
pub mod weather;

// Re-export key types at crate root for ergonomics
pub use error::{ExchangeError, Result};
pub use message::{ContentBlock, Role, Transcript, Turn};
pub use provider::{CompletionOutcome, CompletionRequest, Provider, StopReason};
pub use sheet::{Record, Sheet, SheetStore};
pub use tool::{Arguments, FnTool, ParamSpec, Tool, ToolRegistry, ToolRequest, ToolResult, ToolSpec};
pub use weather::{CurrentWeather, WeatherSource};
