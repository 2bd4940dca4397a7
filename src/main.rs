fn main() {
    if let Err(err) = tabfocus_lib::run() {
        eprintln!("tabfocus: {err:?}");
        std::process::exit(1);
    }
}
