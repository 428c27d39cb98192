fn main() {
    modhost::app::startup::startup();
}
