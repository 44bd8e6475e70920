//! Entropy abstraction for deterministic testing.
//!
//! Decouples qubit preparation and Eve's interception decisions from the
//! system RNG. Production code uses [`StdEntropy`] (optionally seeded so a
//! whole run can be replayed); tests use [`ScriptedEntropy`] to play back an
//! exact sequence of bits, bases, and coin flips.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::qubit::{Basis, Bit, Qubit};

/// Source of the protocol's client-side randomness.
///
/// Covers the three draws the orchestrator makes: Alice's bits, preparation
/// and measurement bases, and Eve's per-round interception trial.
pub trait Entropy: Send {
    /// Draw a uniformly random bit.
    fn random_bit(&mut self) -> Bit;

    /// Draw a uniformly random basis.
    fn random_basis(&mut self) -> Basis;

    /// Bernoulli trial with the given success probability.
    ///
    /// Out-of-range probabilities are clamped to `[0, 1]`; NaN counts as 0.
    fn chance(&mut self, probability: f64) -> bool;

    /// Draw `count` random qubits for Alice.
    fn random_qubits(&mut self, count: usize) -> Vec<Qubit> {
        (0..count).map(|_| Qubit { bit: self.random_bit(), basis: self.random_basis() }).collect()
    }

    /// Draw `count` random measurement bases for Bob.
    fn random_bases(&mut self, count: usize) -> Vec<Basis> {
        (0..count).map(|_| self.random_basis()).collect()
    }
}

/// System RNG, optionally seeded for replayable runs.
#[derive(Debug, Clone)]
pub struct StdEntropy {
    rng: StdRng,
}

impl StdEntropy {
    /// Entropy from the operating system RNG.
    pub fn from_os() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }

    /// Deterministic entropy from a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Entropy for StdEntropy {
    fn random_bit(&mut self) -> Bit {
        Bit::from(self.rng.random_bool(0.5))
    }

    fn random_basis(&mut self) -> Basis {
        if self.rng.random_bool(0.5) { Basis::Diagonal } else { Basis::Rectilinear }
    }

    fn chance(&mut self, probability: f64) -> bool {
        // clamp passes NaN through, and random_bool panics on it.
        if probability.is_nan() {
            return false;
        }
        self.rng.random_bool(probability.clamp(0.0, 1.0))
    }
}

/// Playback entropy for tests.
///
/// Pops scripted values from the front of each queue; an exhausted queue
/// yields `Bit::Zero`, `Basis::Rectilinear`, or `false` so callers never
/// block on a short script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEntropy {
    bits: VecDeque<Bit>,
    bases: VecDeque<Basis>,
    outcomes: VecDeque<bool>,
}

impl ScriptedEntropy {
    /// Empty script (all defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bit draws.
    #[must_use]
    pub fn with_bits(mut self, bits: impl IntoIterator<Item = Bit>) -> Self {
        self.bits.extend(bits);
        self
    }

    /// Queue basis draws.
    #[must_use]
    pub fn with_bases(mut self, bases: impl IntoIterator<Item = Basis>) -> Self {
        self.bases.extend(bases);
        self
    }

    /// Queue Bernoulli outcomes.
    #[must_use]
    pub fn with_outcomes(mut self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        self.outcomes.extend(outcomes);
        self
    }
}

impl Entropy for ScriptedEntropy {
    fn random_bit(&mut self) -> Bit {
        self.bits.pop_front().unwrap_or(Bit::Zero)
    }

    fn random_basis(&mut self) -> Basis {
        self.bases.pop_front().unwrap_or(Basis::Rectilinear)
    }

    fn chance(&mut self, probability: f64) -> bool {
        if probability.is_nan() || probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.outcomes.pop_front().unwrap_or(false)
    }
}
