//! Line pass pipeline

use crate::config::ModulationConfig;
use crate::diagnostics::DiagnosticSink;
use crate::rewriter::StreamRewriter;
use std::sync::Arc;
use wavekit_core::{GcodeError, Result};

/// A whole-file transformation over G-code lines
///
/// Passes run one after another; each receives the previous pass's output.
pub trait LinePass: Send + Sync {
    /// Get the name/identifier of this pass
    fn name(&self) -> &str;

    /// Get a description of what this pass does
    fn description(&self) -> &str;

    /// Check if this pass is enabled
    fn is_enabled(&self) -> bool {
        true
    }

    /// Transform `lines` into the pass output
    fn run(&self, lines: &[String], sink: &dyn DiagnosticSink) -> Result<Vec<String>>;
}

/// Arc-wrapped pass for sharing
pub type PassHandle = Arc<dyn LinePass>;

/// Non-planar modulation of infill and walls
#[derive(Debug, Clone)]
pub struct ModulationPass {
    config: ModulationConfig,
}

impl ModulationPass {
    pub fn new(config: ModulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModulationConfig {
        &self.config
    }
}

impl LinePass for ModulationPass {
    fn name(&self) -> &str {
        "modulation"
    }

    fn description(&self) -> &str {
        "Displaces Z of infill and wall moves along a periodic wave"
    }

    fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    fn run(&self, lines: &[String], sink: &dyn DiagnosticSink) -> Result<Vec<String>> {
        self.config.validate()?;
        let (out, _) = StreamRewriter::new(&self.config).rewrite(lines, sink);
        Ok(out)
    }
}

/// Ordered sequence of line passes
///
/// # Example
/// ```ignore
/// let mut pipeline = PassPipeline::new();
/// pipeline.register(Arc::new(ModulationPass::new(modulation)));
///
/// let output = pipeline.run(lines, &TracingSink)?;
/// ```
#[derive(Default)]
pub struct PassPipeline {
    passes: Vec<PassHandle>,
}

impl PassPipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pass; passes run in registration order
    pub fn register(&mut self, pass: PassHandle) -> &mut Self {
        self.passes.push(pass);
        self
    }

    pub fn register_all(&mut self, passes: Vec<PassHandle>) -> &mut Self {
        self.passes.extend(passes);
        self
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn get_pass_by_name(&self, name: &str) -> Option<&PassHandle> {
        self.passes.iter().find(|p| p.name() == name)
    }

    /// Name, description and enabled flag of every pass
    pub fn list_passes(&self) -> Vec<(&str, &str, bool)> {
        self.passes
            .iter()
            .map(|p| (p.name(), p.description(), p.is_enabled()))
            .collect()
    }

    /// Run every enabled pass over `lines`
    pub fn run(&self, lines: Vec<String>, sink: &dyn DiagnosticSink) -> Result<Vec<String>> {
        let mut current = lines;

        for pass in &self.passes {
            if !pass.is_enabled() {
                sink.debug(&format!("Skipping disabled pass '{}'", pass.name()));
                continue;
            }

            sink.debug(&format!("Running pass '{}' on {} lines", pass.name(), current.len()));
            current = match pass.run(&current, sink) {
                Ok(out) => out,
                Err(e) => {
                    tracing::warn!("Pass '{}' failed: {}", pass.name(), e);
                    return Err(GcodeError::PassFailed {
                        pass: pass.name().to_string(),
                        reason: e.to_string(),
                    }
                    .into());
                }
            };
        }

        Ok(current)
    }
}
