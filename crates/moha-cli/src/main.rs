use std::path::PathBuf;
use std::process::ExitCode;

use moha::run_file_default;

fn main() -> ExitCode {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "moha".to_owned());
    let Some(file) = args.next() else {
        eprintln!("usage: {program} <file.mo>");
        return ExitCode::FAILURE;
    };

    match run_file_default(&PathBuf::from(file)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
