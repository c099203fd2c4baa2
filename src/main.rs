use clap::Parser;
use std::process::ExitCode;

use pz_launcher::cli::Cli;
use pz_launcher::doctor::{build_info_line, run_doctor};
use pz_launcher::launcher::{exit_status_byte, run};
use pz_launcher::{exit_code_for_launcher_error, telemetry_init, LauncherError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry_init(cli.verbose);

    if cli.verbose {
        eprintln!("pz: {}", build_info_line());
    }

    // Doctor runs diagnostics without requiring a config file
    if cli.doctor {
        run_doctor(&cli);
        return ExitCode::from(0);
    }

    match run(&cli) {
        Ok(code) => ExitCode::from(exit_status_byte(code)),
        Err(e @ LauncherError::ConfigMissing(_)) => {
            print!("{e}\r\n");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("pz: {e}");
            ExitCode::from(exit_code_for_launcher_error(&e))
        }
    }
}
