use std::process::ExitCode;

use clap::Parser;

use fixture_test::cli::{Cli, Command};
use fixture_test::error::FixtureTestError;
use fixture_test::{build, exec, health, manifest, output, targets, trace, verify};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.log.init_logger();

    match dispatch(&cli) {
        Ok(value) => match output::emit(cli.output, &value) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                let err = FixtureTestError::Io(e);
                output::emit_error(cli.output, &err);
                err.exit_code()
            }
        },
        Err(e) => {
            log::debug!("{e:?}");
            output::emit_error(cli.output, &e);
            e.exit_code()
        }
    }
}

fn dispatch(cli: &Cli) -> Result<serde_json::Value, FixtureTestError> {
    let manifest_path = cli.manifest.as_deref();
    let load = || manifest::load(manifest_path);

    match &cli.command {
        Command::Targets => targets::list(&load()?),
        Command::Health(args) => health::health(&load()?, args.target.as_deref()),
        Command::Build(args) => build::build(&load()?, args.clone()),
        Command::Run(args) => exec::run(&load()?, args.clone()),
        Command::Verify(args) => verify::verify(&load()?, manifest_path, args.clone()),
        Command::Trace(args) => trace::trace(args.value),
    }
}
