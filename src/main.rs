//! menuforge CLI binary.
//!
//! All logic lives in the library; main only maps the result to a
//! process exit code.

fn main() {
    if let Err(error) = menuforge::cli::run() {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
