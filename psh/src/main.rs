use std::process::ExitCode;

fn main() -> ExitCode {
    psh::lib_main()
}
