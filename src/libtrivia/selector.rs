use crate::libtrivia::question::{QuestionBank, QuestionId};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Question(QuestionId),
    Exhausted,
}

/// Draws questions at random without repeating any within one cycle through the bank.
#[derive(Debug, Clone)]
pub struct RoundSelector {
    rng: StdRng,
    history: HashSet<QuestionId>,
    /// Left out of the next pick only.
    avoid: Option<QuestionId>,
}

impl RoundSelector {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            history: HashSet::new(),
            avoid: None,
        }
    }

    pub fn select_next(&mut self, bank: &QuestionBank) -> Selection {
        let available: Vec<QuestionId> = bank
            .ids()
            .filter(|id| !self.history.contains(id) && Some(*id) != self.avoid)
            .collect();
        match available.choose(&mut self.rng) {
            Some(&id) => {
                self.history.insert(id);
                self.avoid = None;
                debug!(
                    "[Round] Picked question {} ({} of {} used)",
                    id.0,
                    self.history.len(),
                    bank.len()
                );
                Selection::Question(id)
            }
            None => {
                debug!("[Round] All {} questions used.", bank.len());
                Selection::Exhausted
            }
        }
    }

    /// Starts a new cycle over the whole bank. `last` is skipped by the first pick of the
    /// new cycle, unless it is the only question there is, and can come up again after that.
    pub fn restart_cycle(&mut self, bank: &QuestionBank, last: Option<QuestionId>) {
        self.history.clear();
        self.avoid = last.filter(|_| bank.len() > 1);
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.avoid = None;
    }

    pub fn history(&self) -> &HashSet<QuestionId> {
        &self.history
    }
}
