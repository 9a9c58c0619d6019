//! Library-level tests with a substitutable executor

mod baseline_flow;
