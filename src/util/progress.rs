use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::node::NodeId;
use crate::source::{FetchError, MetadataSource};

/// Wraps a source and shows the node being fetched on a stderr spinner.
pub struct SpinnerSource<S> {
    inner: S,
    bar: ProgressBar,
}

impl<S: MetadataSource> SpinnerSource<S> {
    pub fn new(inner: S, enabled: bool) -> Self {
        let bar = if enabled && std::io::stderr().is_terminal() {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} [{pos}] {msg}") {
                bar.set_style(style);
            }
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { inner, bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl<S: MetadataSource> MetadataSource for SpinnerSource<S> {
    fn direct_dependencies(&self, id: &NodeId) -> Result<Vec<NodeId>, FetchError> {
        self.bar.set_message(id.to_string());
        let result = self.inner.direct_dependencies(id);
        self.bar.inc(1);
        result
    }
}
