// One-shot viewport reveal tracking: an element is revealed the first time its
// intersection ratio reaches the threshold, then it is no longer observed.
use std::collections::BTreeSet;

pub const PRODUCT_REVEAL_THRESHOLD: f64 = 0.1;
pub const GALLERY_REVEAL_THRESHOLD: f64 = 0.1;
pub const SECTION_REVEAL_THRESHOLD: f64 = 0.2;

#[derive(Clone, Debug)]
pub struct RevealObserver {
    threshold: f64,
    observed: BTreeSet<String>,
    revealed: BTreeSet<String>,
}

impl RevealObserver {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            observed: BTreeSet::new(),
            revealed: BTreeSet::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn observe(&mut self, element: impl Into<String>) {
        let element = element.into();
        self.revealed.remove(&element);
        self.observed.insert(element);
    }

    /// Swaps the observed set for freshly rendered elements; earlier reveal state is dropped.
    pub fn observe_all<I, E>(&mut self, elements: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        self.observed.clear();
        self.revealed.clear();
        for element in elements {
            self.observe(element);
        }
    }

    pub fn is_observed(&self, element: &str) -> bool {
        self.observed.contains(element)
    }

    pub fn is_revealed(&self, element: &str) -> bool {
        self.revealed.contains(element)
    }

    /// Returns true only on the call that reveals `element`.
    pub fn intersect(&mut self, element: &str, ratio: f64) -> bool {
        if ratio < self.threshold || !self.observed.remove(element) {
            return false;
        }
        self.revealed.insert(element.to_string());
        true
    }
}
