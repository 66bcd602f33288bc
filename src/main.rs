fn main() {
    if let Err(e) = pixel_book::run() {
        eprintln!("pixel-book: {e:#}");
        std::process::exit(1);
    }
}
