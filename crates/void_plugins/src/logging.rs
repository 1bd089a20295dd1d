//! Numeric debug levels over the `log` facade
//!
//! Older hosts control registry verbosity with an integer: `0` reports
//! warnings and errors, `1` adds informational messages and anything above
//! adds debug output. The level maps onto [`log::max_level`]; the installed
//! logger (usually `env_logger`) still decides where records go.

use log::LevelFilter;

/// Set the verbosity from a numeric debug level
pub fn set_debug_level(level: i32) {
    log::set_max_level(level_filter(level));
}

/// Current verbosity as a numeric debug level
pub fn debug_level() -> i32 {
    numeric_level(log::max_level())
}

fn level_filter(level: i32) -> LevelFilter {
    match level {
        l if l > 1 => LevelFilter::Debug,
        1 => LevelFilter::Info,
        _ => LevelFilter::Warn,
    }
}

fn numeric_level(filter: LevelFilter) -> i32 {
    match filter {
        LevelFilter::Trace | LevelFilter::Debug => 2,
        LevelFilter::Info => 1,
        _ => 0,
    }
}
