use std::process::ExitCode;

fn main() -> ExitCode {
    gm_codegen::cli::run()
}
