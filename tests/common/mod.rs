#![allow(dead_code)]

pub use procwatch_test_utils::{init_tracing, quiet_options, with_timeout};
