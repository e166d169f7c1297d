/// Binary entrypoint for the `quantis` executable.
///
/// Keeps the binary thin: all business logic lives in the `quantis_lib` crate
/// so unit tests can import library functions directly.
fn main() {
    quantis_lib::run();
}
