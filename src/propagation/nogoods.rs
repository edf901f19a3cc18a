// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Nogoods learnt at restarts.
//!
//! A nogood is a set of decisions `var = value` that cannot all hold in any
//! solution still to be found. Nogoods live outside the trail: once learnt, they
//! apply to the rest of the worker's search.

use super::PropagationFailure;
use crate::domain::{DomainStore, Restriction};

#[derive(Debug, Clone, Default)]
pub struct NogoodStore {
    nogoods: Vec<Vec<(usize, usize)>>,
}

impl NogoodStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nogoods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nogoods.is_empty()
    }

    pub fn add(&mut self, literals: Vec<(usize, usize)>) {
        self.nogoods.push(literals);
    }

    /// Fail if a nogood holds completely; when all but one literal hold, remove
    /// the value of the last one. Returns whether any domain shrank.
    pub fn propagate(&self, store: &mut DomainStore) -> Result<bool, PropagationFailure> {
        let mut changed = false;
        'nogoods: for nogood in &self.nogoods {
            let mut open = None;
            for &(var, value) in nogood {
                if store.assigned(var) == Some(value) {
                    continue;
                }
                if !store.contains(var, value) || open.is_some() {
                    // a false literal, or two undecided ones: nothing to infer
                    continue 'nogoods;
                }
                open = Some((var, value));
            }
            match open {
                None => {
                    return Err(PropagationFailure::Nogood {
                        literals: nogood.len(),
                    })
                }
                Some((var, value)) => match store.remove(var, value) {
                    Restriction::Emptied => {
                        return Err(PropagationFailure::Nogood {
                            literals: nogood.len(),
                        })
                    }
                    Restriction::Reduced => changed = true,
                    Restriction::Unchanged => {}
                },
            }
        }
        Ok(changed)
    }
}
