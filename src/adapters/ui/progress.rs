//! Terminal progress for the slow, throttled stages.
//! Draws to stderr; indicatif hides the bar when stderr is not a terminal.

use crate::ports::ProgressPort;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

const TEMPLATE: &str = "{spinner:.cyan} {prefix:.bold} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}";

/// indicatif-backed progress. One bar at a time.
#[derive(Default)]
pub struct IndicatifProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressPort for IndicatifProgress {
    fn start(&self, label: &str, total: usize) {
        let style = ProgressStyle::with_template(TEMPLATE)
            .map(|s| s.progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let bar = ProgressBar::new(total as u64)
            .with_style(style)
            .with_prefix(label.to_string());
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(old) = slot.replace(bar) {
                old.finish_and_clear();
            }
        }
    }

    fn advance(&self, item: &str) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.set_message(item.to_string());
                bar.inc(1);
            }
        }
    }

    fn finish(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

/// No-op progress for tests and non-interactive wiring.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressPort for SilentProgress {
    fn start(&self, _label: &str, _total: usize) {}
    fn advance(&self, _item: &str) {}
    fn finish(&self) {}
}
