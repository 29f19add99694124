use std::process::ExitCode;

fn main() -> ExitCode {
    ordena_cli::run()
}
