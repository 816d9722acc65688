use anyhow::{Context, Result};
use std::io;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

/// Filter applied when the configured directive does not parse.
const FALLBACK_FILTER: &str = "info";

/// Initialize logging for the current target.
/// Output goes to the browser console on wasm and to stderr elsewhere.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(filter: &str) -> Result<()> {
    let fmt_layer = fmt::layer()
        .without_time()
        .with_ansi(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_target(false)
        .with_writer(make_writer());

    let subscriber = Registry::default().with(fmt_layer).with(build_filter(filter));
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install the tracing subscriber")?;

    Ok(())
}

fn build_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_new(filter.trim()).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

#[cfg(not(target_arch = "wasm32"))]
fn make_writer() -> fn() -> io::Stderr {
    io::stderr
}

#[cfg(target_arch = "wasm32")]
fn make_writer() -> fn() -> ConsoleWriter {
    ConsoleWriter::default
}

/// Buffers one formatted event and hands it to `console.log` when dropped.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct ConsoleWriter {
    buffer: Vec<u8>,
}

#[cfg(target_arch = "wasm32")]
impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            let line = String::from_utf8_lossy(&self.buffer);
            web_sys::console::log_1(&line.trim_end().into());
            self.buffer.clear();
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

#[cfg(test)]
mod tests {
    use super::build_filter;

    #[test]
    fn valid_directive_is_kept() {
        assert_eq!(build_filter("debug").to_string(), "debug");
        assert_eq!(
            build_filter(" newsletter_gate=trace ").to_string(),
            "newsletter_gate=trace"
        );
    }

    #[test]
    fn invalid_directive_falls_back_to_info() {
        assert_eq!(build_filter("newsletter_gate=loud").to_string(), "info");
    }
}
