// Rating pipeline core: vocabulary, category enumeration, reply parsing,
// and composite score calculation. Everything in here is pure and
// deterministic — no I/O, no LLM calls.

pub mod categories;
pub mod composer;
pub mod parser;
pub mod vocabulary;

pub use composer::{compose, ScoreBreakdown, TotalPolicy, BENCHMARK_SCORE};
