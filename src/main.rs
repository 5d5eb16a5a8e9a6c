fn main() {
    if let Err(err) = invoice_import::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
