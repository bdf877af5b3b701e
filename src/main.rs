use std::io::{self, Write};

use clap::Parser;

use bpfgen::cli::{Cli, Command};
use bpfgen::{compile, CompileConfig, CompileError, IpVersion};

fn exit_code(err: &CompileError) -> i32 {
    match err {
        CompileError::Output(_) => 2,
        _ => 1,
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(exit_code(&e));
    }
}

fn run(cli: Cli) -> Result<(), CompileError> {
    match cli.command {
        Command::Dns(args) => {
            let config = CompileConfig {
                l3_off: args.l3_off,
                ip_version: if args.inet6 {
                    IpVersion::V6
                } else {
                    IpVersion::V4
                },
                ignore_case: args.ignorecase,
                negate: args.negate,
            };

            let stdout = io::stdout();
            let mut out = stdout.lock();
            let name = compile(&args.patterns, &config, &mut out)?;
            out.flush()?;

            log::info!("generated filter {name}");
            // The assembly goes to stdout; the companion name is side-band.
            eprintln!("name: {name}");
            Ok(())
        }
    }
}
