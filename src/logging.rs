use log::LevelFilter;

/// Install the `env_logger` backend.
///
/// `level` wins over `RUST_LOG`, without either only warnings are shown.
/// Calling this more than once is harmless.
pub fn init_logging(level: Option<LevelFilter>) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}
