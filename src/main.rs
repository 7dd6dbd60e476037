//! Minimal harness: print the working directory of a PID.

use std::process::ExitCode;

#[cfg(windows)]
use clap::Parser;

#[cfg(windows)]
#[derive(Parser, Debug)]
#[command(
    name = "proccwd",
    about = "Print the current working directory of a running process",
    after_help = "EXAMPLES:\n  proccwd.exe 4242"
)]
struct Args {
    /// Target process id
    #[arg(value_name = "PID")]
    pid: u32,
}

#[cfg(windows)]
fn main() -> ExitCode {
    // Default to info-level logs for the `proccwd` crate if RUST_LOG is unset.
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "proccwd=info");
    }
    env_logger::init();

    let args = Args::parse();
    match proccwd::cwd_by_pid(args.pid) {
        Ok(cwd) => {
            println!("{}", cwd.to_string_lossy());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("[ERR] pid {}: {e}", args.pid);
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(windows))]
fn main() -> ExitCode {
    eprintln!("proccwd only supports Windows targets");
    ExitCode::FAILURE
}
