use std::collections::VecDeque;

use crate::TICK_PERIOD;

/// One unit of autonomous behavior. Called once per tick until it reports
/// completion; anything long-running keeps its own re-enterable state, the
/// way [`crate::swerve_drive::SwerveDrive::auto_drive`] does.
pub trait AutoStep: Send {
    fn advance(&mut self) -> bool;
}

impl<F> AutoStep for F
where
    F: FnMut() -> bool + Send,
{
    fn advance(&mut self) -> bool {
        self()
    }
}

/// Runs steps strictly in insertion order, one `advance` per tick.
#[derive(Default)]
pub struct Sequencer {
    steps: VecDeque<Box<dyn AutoStep>>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. Fine to call mid-run; only the current step is read
    /// each tick.
    pub fn add(&mut self, step: impl AutoStep + 'static) {
        self.steps.push_back(Box::new(step));
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    /// Advance the current step once, retiring it if it reports completion.
    /// Returns true only once every step has been retired.
    pub fn run(&mut self) -> bool {
        let Some(step) = self.steps.front_mut() else {
            return true;
        };
        if step.advance() {
            self.steps.pop_front();
        }
        self.steps.is_empty()
    }

    /// Drive the whole sequence, yielding to the scheduler for one tick
    /// period between invocations so the host's time-sensitive work keeps
    /// running.
    pub async fn run_to_completion(&mut self) {
        while !self.run() {
            tokio::time::sleep(TICK_PERIOD).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn counted_step(counter: Arc<AtomicUsize>, finish_after: usize) -> impl AutoStep + 'static {
        move || counter.fetch_add(1, Ordering::SeqCst) + 1 >= finish_after
    }

    #[test]
    fn steps_run_in_order_without_overlap() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let mut auto = Sequencer::new();
        auto.add(counted_step(first.clone(), 3));
        auto.add(counted_step(second.clone(), 2));

        assert!(!auto.run());
        assert!(!auto.run());
        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        // third call retires the first step
        assert!(!auto.run());
        assert_eq!(first.load(Ordering::SeqCst), 3);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        assert!(!auto.run());
        assert!(auto.run());
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn exhausted_sequencer_keeps_reporting_done() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut auto = Sequencer::new();
        auto.add(counted_step(counter.clone(), 1));

        assert!(auto.run());
        assert!(auto.run());
        assert!(auto.run());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_sequencer_is_done() {
        let mut auto = Sequencer::new();
        assert!(auto.run());
    }

    #[test]
    fn steps_can_be_added_mid_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut auto = Sequencer::new();
        auto.add(counted_step(counter.clone(), 2));

        assert!(!auto.run());
        auto.add(counted_step(counter.clone(), 3));
        assert_eq!(auto.remaining(), 2);

        // second call retires the first step, third retires the appended one
        assert!(!auto.run());
        assert!(auto.run());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn run_to_completion_drains_the_queue() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut auto = Sequencer::new();
        auto.add(counted_step(counter.clone(), 3));
        auto.add(counted_step(counter.clone(), 4));

        auto.run_to_completion().await;
        assert_eq!(auto.remaining(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }
}
