fn main() {
    tether::run();
}
