//! different utility modules used throughout the project
/// logger initialisation: terminal logger plus optional log file
pub mod logger;
/// reader for sectioned `key: values` configuration documents
pub mod task_parser;
