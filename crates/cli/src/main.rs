fn main() {
    if let Err(e) = routescope_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
