use std::sync::Once;

static INIT: Once = Once::new();

/// Installs the log4rs logger described by `logging_config.yaml`. Only the
/// first call of a test binary does anything.
pub fn init_default_logging() {
    INIT.call_once(|| {
        log4rs::init_file(
            concat!(env!("CARGO_MANIFEST_DIR"), "/logging_config.yaml"),
            Default::default(),
        )
        .unwrap();
    });
}
