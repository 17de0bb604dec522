fn main() {
    if let Err(err) = alpm_dump::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
