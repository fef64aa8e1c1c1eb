//! Deployment status reported back to the outer system

use serde::{Deserialize, Serialize};

/// Progress log and final outcome of one provider run
///
/// Created when the run starts, appended to at every phase boundary and
/// finalized once, either by a successful notify or by the caller marking
/// the run failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    log: Vec<String>,
    success: Option<bool>,
    output: String,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a progress line
    pub fn log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.log
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn set_output(&mut self, output: impl Into<String>) {
        self.output = output.into();
    }

    /// `None` while the run has not been finalized
    pub fn success(&self) -> Option<bool> {
        self.success
    }

    pub fn succeed(&mut self) {
        self.success = Some(true);
    }

    /// Marks the run failed. Never downgrades an already successful run.
    pub fn fail(&mut self) {
        if self.success != Some(true) {
            self.success = Some(false);
        }
    }
}
