fn main() {
    if let Err(err) = timely_lib::run() {
        eprintln!("timely: {err:#}");
        std::process::exit(1);
    }
}
