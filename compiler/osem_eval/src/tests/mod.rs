//! Evaluator scenario tests.
//!
//! Programs are assembled with `ProgramBuilder` and run end to end through
//! `evaluate_with_mode`.

mod construct_tests;
