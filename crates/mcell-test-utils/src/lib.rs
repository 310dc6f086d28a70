//! Test utilities and mock types for MCell development.
//!
//! Provides deterministic implementations of the core collaborator traits
//! ([`RandomSource`], [`IterationObserver`]) and model [`fixtures`] for
//! constructing test scenarios.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use mcell_core::{IterationObserver, ObserverError, PopulationView, RandomError, RandomSource, Vec3};

/// Random source that replays fixed sequences.
///
/// Uniform and normal draws come from separate queues. Once a queue is
/// empty, draws from it fail with [`RandomError::Exhausted`], which makes
/// it easy to assert exactly how much randomness code under test uses.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    uniforms: VecDeque<f64>,
    normals: VecDeque<f64>,
}

impl ScriptedSource {
    pub fn new(uniforms: Vec<f64>, normals: Vec<f64>) -> Self {
        Self {
            uniforms: uniforms.into(),
            normals: normals.into(),
        }
    }

    /// A source that fails on the first draw.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `(uniforms, normals)` not yet consumed.
    pub fn remaining(&self) -> (usize, usize) {
        (self.uniforms.len(), self.normals.len())
    }
}

impl RandomSource for ScriptedSource {
    fn uniform(&mut self) -> Result<f64, RandomError> {
        self.uniforms.pop_front().ok_or(RandomError::Exhausted)
    }

    fn normal(&mut self) -> Result<f64, RandomError> {
        self.normals.pop_front().ok_or(RandomError::Exhausted)
    }
}

/// Random source that always returns the same values and counts draws.
#[derive(Clone, Debug)]
pub struct ConstantSource {
    uniform: f64,
    normal: f64,
    uniform_draws: u64,
    normal_draws: u64,
}

impl ConstantSource {
    pub fn new(uniform: f64, normal: f64) -> Self {
        Self {
            uniform,
            normal,
            uniform_draws: 0,
            normal_draws: 0,
        }
    }

    pub fn uniform_draws(&self) -> u64 {
        self.uniform_draws
    }

    pub fn normal_draws(&self) -> u64 {
        self.normal_draws
    }
}

impl RandomSource for ConstantSource {
    fn uniform(&mut self) -> Result<f64, RandomError> {
        self.uniform_draws += 1;
        Ok(self.uniform)
    }

    fn normal(&mut self) -> Result<f64, RandomError> {
        self.normal_draws += 1;
        Ok(self.normal)
    }
}

/// Random source that fails every draw with [`RandomError::Failed`].
#[derive(Clone, Debug, Default)]
pub struct FailingSource;

impl RandomSource for FailingSource {
    fn uniform(&mut self) -> Result<f64, RandomError> {
        Err(RandomError::Failed {
            reason: "injected failure".into(),
        })
    }

    fn normal(&mut self) -> Result<f64, RandomError> {
        self.uniform()
    }
}

/// One population snapshot captured by [`RecordingObserver`].
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub iteration: u64,
    /// `(species name, position)` pairs, species-major.
    pub positions: Vec<(String, Vec3)>,
}

/// Observer that records every callback.
///
/// Can be told to fail at a given iteration, or to run a hook once a
/// given iteration has been recorded (used to trigger cancellation from
/// inside a run).
#[derive(Default)]
pub struct RecordingObserver {
    project_path: Option<PathBuf>,
    frames: Vec<Frame>,
    finished: Option<u64>,
    fail_at: Option<u64>,
    hook: Option<(u64, Box<dyn FnMut()>)>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// An observer whose `on_iteration` fails at `iteration`.
    pub fn failing_at(iteration: u64) -> Self {
        Self {
            fail_at: Some(iteration),
            ..Self::default()
        }
    }

    /// Run `hook` right after `iteration` has been recorded.
    pub fn on_reaching(mut self, iteration: u64, hook: impl FnMut() + 'static) -> Self {
        self.hook = Some((iteration, Box::new(hook)));
        self
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Iteration numbers seen, in callback order.
    pub fn iterations(&self) -> Vec<u64> {
        self.frames.iter().map(|f| f.iteration).collect()
    }

    /// The value passed to `finish`, if it was called.
    pub fn finished(&self) -> Option<u64> {
        self.finished
    }
}

impl IterationObserver for RecordingObserver {
    fn begin(&mut self, project_path: &Path) -> Result<(), ObserverError> {
        self.project_path = Some(project_path.to_path_buf());
        Ok(())
    }

    fn on_iteration(
        &mut self,
        iteration: u64,
        population: &PopulationView<'_>,
    ) -> Result<(), ObserverError> {
        if self.fail_at == Some(iteration) {
            return Err(ObserverError::new(format!(
                "injected failure at iteration {iteration}"
            )));
        }
        self.frames.push(Frame {
            iteration,
            positions: population
                .positions()
                .map(|(name, p)| (name.to_string(), p))
                .collect(),
        });
        if let Some((at, hook)) = self.hook.as_mut() {
            if *at == iteration {
                hook();
            }
        }
        Ok(())
    }

    fn finish(&mut self, iterations_completed: u64) -> Result<(), ObserverError> {
        self.finished = Some(iterations_completed);
        Ok(())
    }
}
