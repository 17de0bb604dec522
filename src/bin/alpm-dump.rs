//! Binary under the tool's conventional dashed name (`alpm-dump`) that
//! forwards to the `alpm_dump` library.

fn main() {
    if let Err(err) = alpm_dump::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
