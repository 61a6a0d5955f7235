fn main() {
    depgraph::cli::run();
}
