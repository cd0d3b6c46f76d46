//! Integration tests for the ilsplice workspace, grouped by crate.

#[cfg(test)]
mod core;
#[cfg(test)]
mod e2e;

#[cfg(test)]
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
pub(crate) const POPULATE_LEVEL: &str = include_str!("../fixtures/populate_level.il");
