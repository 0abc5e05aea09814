//! Terminal logging using simplelog
//!
//! Logs go to stderr so that the event handler's output stays separate
//! from anything a caller may pipe.

use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

/// Parse a `RUST_LOG` style level, defaulting to info
fn level_from(value: Option<&str>) -> LevelFilter {
    match value.map(|v| v.to_lowercase()).as_deref() {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Initialize terminal logging
///
/// The level comes from `RUST_LOG`.
pub fn init() {
    let level = level_from(std::env::var("RUST_LOG").ok().as_deref());

    // Configure simplelog with timestamps
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|c| c) // Fallback if local time offset fails
        .build();

    if let Err(e) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Failed to initialize logger: {}", e);
    }
}
