//! Constraint model builder and solver driver (`spec.md` §4.2/§4.3).
//!
//! Replaces the teacher's dependency on `solverforge`'s constraint-stream
//! engine (dropped — see `DESIGN.md`) with a hand-rolled model
//! ([`model`]), scorer ([`score`]), and local-search driver ([`engine`]),
//! sharing the coverage formula ([`coverage`]) with the result renderer.

pub mod coverage;
pub mod engine;
pub mod model;
pub mod score;

pub use engine::{solve, SolveOutcome, SolverConfig};
pub use model::{Cell, Model, Solution};
pub use score::HardSoftScore;
