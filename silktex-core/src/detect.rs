//! Typesetter binary detection

use log::debug;
use std::process::{Command, Stdio};

use crate::typeset::Engine;

/// Per-engine availability, probed once at startup and read-only for the
/// process lifetime. Never re-probed mid-run; an engine installed after
/// startup is picked up on the next launch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectionState {
    available: [bool; Engine::ALL.len()],
}

impl DetectionState {
    /// Probe every known engine binary on PATH
    pub fn probe() -> Self {
        let mut available = [false; Engine::ALL.len()];
        for (idx, engine) in Engine::ALL.into_iter().enumerate() {
            available[idx] = probe_binary(engine.name());
            debug!(
                "typesetter probe: {} {}",
                engine.name(),
                if available[idx] { "found" } else { "not found" }
            );
        }
        Self { available }
    }

    /// Construct a state with every engine marked missing
    pub fn empty() -> Self {
        Self {
            available: [false; Engine::ALL.len()],
        }
    }

    pub fn is_available(&self, engine: Engine) -> bool {
        self.available[engine as usize]
    }
}

/// A binary counts as present when it runs and answers a version query
fn probe_binary(binary: &str) -> bool {
    Command::new(binary)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
