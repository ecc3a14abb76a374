fn main() {
    if let Err(err) = field_renamer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
