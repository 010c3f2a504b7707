// Output module: diagnostics on stderr, JSON documents on stdout

use std::io::{self, Write};

use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

pub mod errors;

pub use errors::*;

/// Install the tracing subscriber.
///
/// Everything goes to stderr so stdout only ever carries the JSON
/// document. Escape codes are only written to a terminal. `RUST_LOG`
/// overrides the level picked by `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. from tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(errors::should_use_colors())
        .with_target(false)
        .try_init();
}

/// Render a document as 2-space indented JSON.
///
/// Falls back to `{}` if serialization fails so the caller always
/// receives valid JSON.
pub fn render_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        error!("Failed to serialize inventory: {}", e);
        "{}".to_string()
    })
}

/// Print a document to stdout followed by a newline
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", render_json(value))?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_json_two_space_indent() {
        let rendered = render_json(&json!({"all": {"hosts": []}}));
        assert_eq!(rendered, "{\n  \"all\": {\n    \"hosts\": []\n  }\n}");
    }
}
