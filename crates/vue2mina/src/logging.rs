//! Logging setup for the command-line tool.
//!
//! Library crates log through the `log` facade; this module installs
//! `env_logger` once. Levels follow the `-v` count:
//!
//! - no flag: `warn`
//! - `-v`: `info` (one line per converted file)
//! - `-vv`: `debug` (one line per pipeline stage)
//! - `-vvv`: `trace` (every rewrite)
//!
//! `RUST_LOG` takes precedence when set, e.g.
//! `RUST_LOG=mina_transformer::behavior=trace vue2mina App.vue`.

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Maps the `-v` count to a level.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initializes logging; later calls are no-ops.
pub fn init(verbosity: u8) {
    INIT.call_once(|| {
        let mut builder = if std::env::var_os("RUST_LOG").is_some() {
            Builder::from_env(Env::default())
        } else {
            let mut builder = Builder::new();
            builder.filter_level(level_for(verbosity));
            builder
        };

        builder
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{:5}] {} - {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), LevelFilter::Warn);
        assert_eq!(level_for(1), LevelFilter::Info);
        assert_eq!(level_for(2), LevelFilter::Debug);
        assert_eq!(level_for(7), LevelFilter::Trace);
    }

    #[test]
    fn test_init_is_idempotent() {
        init(0);
        init(3);
        assert!(INIT.is_completed());
    }
}
