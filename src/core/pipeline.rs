//! Pipeline definition: the fixed, ordered list of steps

use crate::core::config::InstallConfig;
use crate::core::step::Step;
use std::collections::HashSet;
use thiserror::Error;

/// Errors building a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("duplicate step name: {0}")]
    DuplicateStepName(String),
}

/// Builds the message shown once every step has succeeded
pub type CompletionMessage = fn(&InstallConfig) -> String;

fn default_completion_message(_config: &InstallConfig) -> String {
    "Installation completed successfully".to_string()
}

/// An ordered sequence of steps.
///
/// Positions are the resume key: index `i` names the same stage in every
/// run, so the list is never reordered once built.
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    steps: Vec<Box<dyn Step>>,
    completion_message: CompletionMessage,
}

impl Pipeline {
    /// Create a pipeline, rejecting duplicate step names
    pub fn new(name: impl Into<String>, steps: Vec<Box<dyn Step>>) -> Result<Self, PipelineError> {
        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.name()) {
                return Err(PipelineError::DuplicateStepName(step.name().to_string()));
            }
        }

        Ok(Self {
            name: name.into(),
            steps,
            completion_message: default_completion_message,
        })
    }

    pub fn with_completion_message(mut self, message: CompletionMessage) -> Self {
        self.completion_message = message;
        self
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get the step at a position
    pub fn step(&self, index: usize) -> Option<&dyn Step> {
        self.steps.get(index).map(|s| s.as_ref())
    }

    /// Iterate over steps in execution order
    pub fn steps(&self) -> impl Iterator<Item = &dyn Step> {
        self.steps.iter().map(|s| s.as_ref())
    }

    /// Step names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Final message for a completed run
    pub fn completion_message(&self, config: &InstallConfig) -> String {
        (self.completion_message)(config)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("steps", &self.names())
            .finish()
    }
}
