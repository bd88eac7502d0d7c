use github_build::cli::CliArgs;
use github_build::util::{init_logging, LoggingConfig};
use github_build::{Application, VERSION};

use std::env;
use tracing::debug;

fn main() {
    let raw: Vec<String> = env::args().skip(1).collect();
    let (args, recorded) = CliArgs::from_invocation(raw).unwrap_or_else(|e| e.exit());

    init_logging(LoggingConfig::from_switches(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("github-build v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let show_chain = args.debug || env::var_os("DEBUG").is_some();
    let exit_code = match Application::new(args, recorded).run() {
        Ok(report) => {
            debug!("Run report: {:?}", report);
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if show_chain {
                eprintln!("{:?}", e);
            }
            1
        }
    };

    std::process::exit(exit_code);
}
