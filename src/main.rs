fn main() {
    if let Err(err) = trilateration_renderer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
