use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// How much of the crate's own logging reaches the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (true, _) => Verbosity::Verbose,
            (false, true) => Verbosity::Quiet,
            (false, false) => Verbosity::Normal,
        }
    }

    pub fn level(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::ERROR,
            Verbosity::Normal => LevelFilter::WARN,
            Verbosity::Verbose => LevelFilter::DEBUG,
        }
    }
}

/// Logs go to stderr so the tables printed on stdout can be piped. `RUST_LOG` wins when set.
pub fn init_logging(verbosity: Verbosity) {
    let level = verbosity.level();
    let app_filter = Targets::new().with_target("macrofeed", level);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let fmt_layer = fmt::layer().with_writer(std::io::stderr).without_time();
    let fmt_layer = match verbosity {
        Verbosity::Verbose => fmt_layer.pretty().boxed(),
        _ => fmt_layer.compact().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(app_filter)
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_wins_over_quiet() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn test_levels() {
        assert_eq!(Verbosity::Quiet.level(), LevelFilter::ERROR);
        assert_eq!(Verbosity::Normal.level(), LevelFilter::WARN);
        assert_eq!(Verbosity::Verbose.level(), LevelFilter::DEBUG);
        assert_eq!(Verbosity::default(), Verbosity::Normal);
    }
}
