//! Lesson order assignment
//!
//! Lesson pages arrive in nondeterministic order under concurrency, but each
//! distinct title must get one stable order number. The assigner is the
//! single critical section for both the order number and, under continuous
//! numbering, the slide index base.

use crate::config::SlideNumbering;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct AssignerState {
    orders: HashMap<String, u32>,
    next_order: u32,
    // Slides already consumed per title, only read in continuous mode
    slide_counts: HashMap<String, u32>,
}

/// Assigns stable lesson order numbers and slide index bases
#[derive(Debug)]
pub struct OrderAssigner {
    state: Mutex<AssignerState>,
    numbering: SlideNumbering,
}

impl OrderAssigner {
    pub fn new(numbering: SlideNumbering) -> Self {
        Self {
            state: Mutex::new(AssignerState {
                next_order: 1,
                ..Default::default()
            }),
            numbering,
        }
    }

    /// Returns the order number for a title, allocating on first sighting
    ///
    /// Counter starts at 1 and increments by 1 per new title, with no gaps
    /// or reuse, regardless of which worker gets here first.
    pub fn order_for(&self, title: &str) -> u32 {
        let mut state = self.state.lock().unwrap();
        Self::order_for_locked(&mut state, title)
    }

    /// Atomically resolves the order number and the first slide index for a
    /// page contributing `slide_count` slides to `title`
    ///
    /// Per-page numbering always starts at 1; continuous numbering reserves
    /// a range so pages sharing a title cannot hand out colliding indices.
    pub fn assign(&self, title: &str, slide_count: u32) -> (u32, u32) {
        let mut state = self.state.lock().unwrap();
        let order = Self::order_for_locked(&mut state, title);

        let base = match self.numbering {
            SlideNumbering::PerPage => 1,
            SlideNumbering::Continuous => {
                let seen = state.slide_counts.entry(title.to_string()).or_insert(0);
                let base = *seen + 1;
                *seen += slide_count;
                base
            }
        };

        (order, base)
    }

    fn order_for_locked(state: &mut AssignerState, title: &str) -> u32 {
        if let Some(&order) = state.orders.get(title) {
            return order;
        }

        let order = state.next_order;
        state.orders.insert(title.to_string(), order);
        state.next_order += 1;
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_sighting_allocates_sequentially() {
        let assigner = OrderAssigner::new(SlideNumbering::PerPage);
        assert_eq!(assigner.order_for("Lesson 1"), 1);
        assert_eq!(assigner.order_for("Lesson 2"), 2);
        assert_eq!(assigner.order_for("Lesson 3"), 3);
    }

    #[test]
    fn test_repeat_title_returns_same_order() {
        let assigner = OrderAssigner::new(SlideNumbering::PerPage);
        assert_eq!(assigner.order_for("Lesson 1"), 1);
        assert_eq!(assigner.order_for("Lesson 2"), 2);
        assert_eq!(assigner.order_for("Lesson 1"), 1);
        // No gap was burned by the repeat
        assert_eq!(assigner.order_for("Lesson 3"), 3);
    }

    #[test]
    fn test_per_page_numbering_always_restarts() {
        let assigner = OrderAssigner::new(SlideNumbering::PerPage);
        assert_eq!(assigner.assign("L1", 5), (1, 1));
        assert_eq!(assigner.assign("L1", 3), (1, 1));
    }

    #[test]
    fn test_continuous_numbering_reserves_ranges() {
        let assigner = OrderAssigner::new(SlideNumbering::Continuous);
        assert_eq!(assigner.assign("L1", 5), (1, 1));
        // Second page of the same lesson continues after the first
        assert_eq!(assigner.assign("L1", 3), (1, 6));
        assert_eq!(assigner.assign("L2", 2), (2, 1));
        assert_eq!(assigner.assign("L1", 2), (1, 9));
    }

    #[test]
    fn test_concurrent_allocation_no_gaps_or_duplicates() {
        let assigner = Arc::new(OrderAssigner::new(SlideNumbering::PerPage));
        let mut handles = Vec::new();

        for i in 0..16 {
            let assigner = Arc::clone(&assigner);
            handles.push(std::thread::spawn(move || {
                assigner.order_for(&format!("Lesson {}", i % 8))
            }));
        }

        let mut orders: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        orders.sort_unstable();
        orders.dedup();

        // 8 distinct titles -> exactly the orders 1..=8
        assert_eq!(orders, (1..=8).collect::<Vec<u32>>());
    }
}
