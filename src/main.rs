fn main() {
    screenconfig::cli::run(std::env::args().collect());
}
