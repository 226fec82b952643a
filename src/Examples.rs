//! examples of usage of RustedReduce
/// rewriting and evaluation examples
pub mod rewrite_examples;
