//! Composition of prompt decorators.
//!
//! [`CompositionEngine`] turns an ordered list of bound decorator instances
//! and a base prompt into the final prompt text. It enforces compatibility
//! (conflicts, requirements, standard and model gating), expands the
//! `Chain`, `Priority`, and `Conditional` meta-decorators, and arranges the
//! rendered fragments by placement and composition behavior.
//!
//! [`syntax::parse`] reads inline `+++Name(args)` invocations, and
//! [`CompositionEngine::apply`] wires parsing, binding, and composition
//! together.

#![warn(missing_docs, clippy::pedantic)]

mod engine;
mod error;
pub mod meta;
pub mod syntax;

pub use engine::{CompositionEngine, CompositionPlan};
pub use error::{CompositionError, CompositionResult, DecoratorError, DecoratorResult};
pub use meta::{MetaKind, PlannedStep, PriorityMode};
pub use syntax::{Invocation, ParsedPrompt, SyntaxError, parse};
