//! Owned collaborator set

use alloc::boxed::Box;

use badge_core::{Display, RandomSource, Scoring, Services, Storage};

/// The external collaborators a badge owns for its lifetime
pub struct ServiceSet {
    display: Box<dyn Display>,
    storage: Box<dyn Storage>,
    scoring: Box<dyn Scoring>,
    random: Box<dyn RandomSource>,
}

impl ServiceSet {
    pub fn new(
        display: Box<dyn Display>,
        storage: Box<dyn Storage>,
        scoring: Box<dyn Scoring>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            display,
            storage,
            scoring,
            random,
        }
    }

    /// Borrow the set for one callback
    pub fn services(&mut self) -> Services<'_> {
        Services::new(
            &mut *self.display,
            &mut *self.storage,
            &mut *self.scoring,
            &mut *self.random,
        )
    }

    pub fn storage(&self) -> &dyn Storage {
        &*self.storage
    }
}
