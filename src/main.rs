fn main() {
    if let Err(e) = goniometry::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
