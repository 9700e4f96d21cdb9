pub mod app;
pub mod domain;
pub mod infra;
pub mod mine;
pub mod synth;
pub mod ui;

/// Install the global tracing subscriber. Writes to stderr so the
/// terminal UI keeps stdout to itself.
pub fn init() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
}
