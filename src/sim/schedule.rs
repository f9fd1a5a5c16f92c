//! Deadline queue for delayed actions
//!
//! Entries are due relative to the queue's own clock, which only moves when
//! the owner calls [`Scheduler::advance`]. Invalidating bumps the generation,
//! so nothing queued before it can ever fire.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry<T> {
    due_ms: f64,
    generation: u32,
    /// Insertion order, keeps equal deadlines FIFO
    seq: u64,
    action: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler<T> {
    clock_ms: f64,
    generation: u32,
    next_seq: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            clock_ms: 0.0,
            generation: 0,
            next_seq: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to fire `delay_ms` from now
    pub fn schedule_in(&mut self, delay_ms: f64, action: T) {
        let delay = if delay_ms.is_finite() { delay_ms.max(0.0) } else { 0.0 };
        self.entries.push(Entry {
            due_ms: self.clock_ms + delay,
            generation: self.generation,
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
    }

    /// Move the clock forward and return every action now due, earliest first
    pub fn advance(&mut self, dt_ms: f64) -> Vec<T> {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.clock_ms += dt_ms;
        }

        let now = self.clock_ms;
        let generation = self.generation;
        self.entries.retain(|e| e.generation == generation);

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| e.due_ms <= now);
        self.entries = pending;

        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|e| e.action).collect()
    }

    /// Drop everything queued so far
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_when_due_in_order() {
        let mut queue = Scheduler::new();
        queue.schedule_in(500.0, "late");
        queue.schedule_in(250.0, "early");
        queue.schedule_in(250.0, "early-second");

        assert!(queue.advance(100.0).is_empty());
        assert_eq!(queue.advance(150.0), vec!["early", "early-second"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.advance(1000.0), vec!["late"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_invalidated_entries_never_fire() {
        let mut queue = Scheduler::new();
        queue.schedule_in(100.0, 1);
        queue.schedule_in(200.0, 2);
        queue.invalidate();
        queue.schedule_in(300.0, 3);

        let fired = queue.advance(1000.0);
        assert_eq!(fired, vec![3]);
    }

    #[test]
    fn test_negative_delay_fires_on_next_advance() {
        let mut queue = Scheduler::new();
        queue.schedule_in(-50.0, 'x');
        assert_eq!(queue.advance(0.0), vec!['x']);
    }

    #[test]
    fn test_clock_ignores_bad_deltas() {
        let mut queue: Scheduler<u8> = Scheduler::new();
        queue.advance(f64::NAN);
        queue.advance(-20.0);
        assert_eq!(queue.clock_ms(), 0.0);
    }
}
