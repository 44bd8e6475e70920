//! Transient photon animation tokens.
//!
//! A [`Photon`] is spawned when a qubit goes on the wire and pruned once its
//! flight across the channel panel has finished. The field never outlives a
//! run; prepare and reset clear it wholesale.

use crate::qubit::{Basis, Bit};

/// One in-flight photon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Photon {
    /// Monotonic id within the field.
    pub id: u64,
    /// Encoded bit.
    pub bit: Bit,
    /// Preparation basis.
    pub basis: Basis,
    /// Transmission round this photon belongs to.
    pub round: usize,
    /// Eve measured this photon mid-flight.
    pub intercepted: bool,
    /// Flight animation has finished.
    pub complete: bool,
}

/// The set of photons currently crossing the channel.
#[derive(Debug, Clone, Default)]
pub struct PhotonField {
    photons: Vec<Photon>,
    next_id: u64,
}

impl PhotonField {
    /// Empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a photon for `round` and return its id.
    pub fn spawn(&mut self, bit: Bit, basis: Basis, round: usize) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.photons.push(Photon { id, bit, basis, round, intercepted: false, complete: false });
        id
    }

    /// Mark the photon of `round` as intercepted.
    pub fn mark_intercepted(&mut self, round: usize) {
        if let Some(photon) = self.photons.iter_mut().find(|p| p.round == round) {
            photon.intercepted = true;
        }
    }

    /// Mark a photon's flight as finished.
    pub fn mark_complete(&mut self, id: u64) {
        if let Some(photon) = self.photons.iter_mut().find(|p| p.id == id) {
            photon.complete = true;
        }
    }

    /// Mark the photon of `round` as finished (it reached Bob's detector).
    pub fn mark_round_complete(&mut self, round: usize) {
        if let Some(photon) = self.photons.iter_mut().find(|p| p.round == round) {
            photon.complete = true;
        }
    }

    /// Drop photons whose flight has finished.
    pub fn prune(&mut self) {
        self.photons.retain(|p| !p.complete);
    }

    /// Photons still in flight or awaiting pruning.
    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.photons.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_intercept_complete_prune() {
        let mut field = PhotonField::new();
        let a = field.spawn(Bit::Zero, Basis::Rectilinear, 0);
        let b = field.spawn(Bit::One, Basis::Diagonal, 1);
        assert_ne!(a, b);

        field.mark_intercepted(1);
        assert!(field.photons()[1].intercepted);
        assert!(!field.photons()[0].intercepted);

        field.mark_complete(a);
        field.prune();
        assert_eq!(field.photons().len(), 1);
        assert_eq!(field.photons()[0].id, b);
    }
}
