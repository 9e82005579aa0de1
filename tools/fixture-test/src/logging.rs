//! Logging options shared by every subcommand.

use clap::ArgAction;

/// Common logging options.
#[derive(clap::Args, Debug, Default)]
pub struct LogOptions {
    /// Increase log verbosity. Pass multiple times for more log output.
    ///
    /// By default only errors are shown. `-v` adds warnings, `-vv` info,
    /// `-vvv` debug, and `-vvvv` trace.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Set fancier logging filters, in `env_logger` syntax.
    #[arg(long = "log-filter", env = "FIXTURE_TEST_LOG", global = true)]
    pub log_filter: Option<String>,
}

impl LogOptions {
    /// Build and install the global logger. Logs always go to stderr so
    /// stdout stays a single JSON object in JSON mode.
    pub fn init_logger(&self) {
        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(self.verbosity_level())
            .parse_filters(self.log_filter.as_deref().unwrap_or(""))
            .target(env_logger::Target::Stderr);
        // A logger may already be installed; keep the first one.
        let _ = builder.try_init();
    }

    /// Convert the -vvv.. count into a log level.
    pub fn verbosity_level(&self) -> log::LevelFilter {
        match self.verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
