//! Progress bar for multi-path loads
//!
//! Counts completed paths; the message shows the path being synced.

use super::OutputConfig;

/// Progress bar wrapper
///
/// Hidden in quiet or JSON mode, or when progress is disabled.
#[derive(Debug)]
pub struct ProgressBar {
    bar: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a bar counting `total` paths
    pub fn counter(config: OutputConfig, total: u64) -> Self {
        if config.quiet || config.json || config.no_progress {
            return Self { bar: None };
        }

        let bar = indicatif::ProgressBar::new(total);
        match indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            Ok(style) => bar.set_style(style.progress_chars("#>-")),
            Err(e) => tracing::debug!(error = %e, "Invalid progress template"),
        }
        bar.enable_steady_tick(std::time::Duration::from_millis(100));

        Self { bar: Some(bar) }
    }

    pub fn inc(&self, delta: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(delta);
        }
    }

    pub fn set_message(&self, message: String) {
        if let Some(bar) = &self.bar {
            bar.set_message(message);
        }
    }

    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}
