//! Parsing and resolution engine.
//!
//! This module wires the three stages a parse runs through. The static side
//! happens once, at construction; the dynamic side runs per call.
//!
//! ```text
//! pattern ── compiler::compile ──▶ Vec<PatternItem>     (compiler.rs, once)
//!                                        │
//! input ───────────── Parser::run ───────┼──▶ ParsedFields   (parser.rs)
//!                                        │
//! date ─────────────── resolve ──────────┴──▶ mutated date   (resolve.rs)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `compiler.rs`: scans the pattern into literal/whitespace/field elements
//!   and marks the heads of abutting numeric runs; resolves the standard
//!   format selectors.
//! - `parser.rs`: walks the element list over the input with one shared
//!   position, dispatching per-letter sub-parsers and running the
//!   abutting-run retry loop.
//! - `resolve.rs`: folds the accumulated fields into the caller's date value
//!   in the fixed observable order (year, month/day dance, time of day,
//!   validation, timezone shift, century fixup, weekday adjustment).
//!
//! ## Debugging
//!
//! Set `DATEPATTERN_DEBUG=1` to print match-failure and retry traces.

#[path = "engine/compiler.rs"]
pub(crate) mod compiler;
#[path = "engine/parser.rs"]
mod parser;
#[path = "engine/resolve.rs"]
mod resolve;

pub(crate) use parser::Parser;
pub(crate) use resolve::resolve;
