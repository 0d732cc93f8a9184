//! Filter Evaluator (C6): compiles a declarative [`crate::config`] document
//! into a cost-ordered [`CompiledFilter`], then evaluates seeds against it
//! in two stages — a cheap, `LANES`-wide [`evaluate::vector_prefilter_batch`]
//! and the authoritative [`evaluate::evaluate_seed`] — and scores survivors
//! against a [`score::Cutoff`].

pub mod compile;
pub mod evaluate;
pub mod score;

pub use compile::CompiledFilter;
pub use evaluate::{vector_prefilter_batch, evaluate_seed, MatchOutcome};
pub use score::{Cutoff, AutoCutoff, Clock, SystemClock};
