//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    env_logger::init();
    if let Err(err) = tourway_cli::run() {
        eprintln!("tourway: {err}");
        std::process::exit(1);
    }
}
