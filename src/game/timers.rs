use super::effects::Effect;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimedEvent {
    EffectExpired { effect: Effect, generation: u64 },
    Shrink,
}

/// Deferred events ordered by due time, then by insertion order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<(i64, u64, TimedEvent)>>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_at: i64, event: TimedEvent) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(Reverse((due_at, seq, event)));
    }

    pub fn next_deadline(&self) -> Option<i64> {
        self.heap.peek().map(|Reverse((due_at, _, _))| *due_at)
    }

    pub fn pop_due(&mut self, now: i64) -> Option<TimedEvent> {
        let Reverse((due_at, _, _)) = self.heap.peek()?;
        if *due_at > now {
            return None;
        }
        self.heap.pop().map(|Reverse((_, _, event))| event)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_order_and_waits_for_deadline() {
        let mut queue = TimerQueue::new();
        queue.schedule(300, TimedEvent::Shrink);
        queue.schedule(
            100,
            TimedEvent::EffectExpired {
                effect: Effect::Boost,
                generation: 1,
            },
        );
        assert_eq!(queue.next_deadline(), Some(100));
        assert_eq!(queue.pop_due(99), None);
        assert_eq!(
            queue.pop_due(100),
            Some(TimedEvent::EffectExpired {
                effect: Effect::Boost,
                generation: 1
            })
        );
        assert_eq!(queue.pop_due(200), None);
        assert_eq!(queue.pop_due(300), Some(TimedEvent::Shrink));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn same_deadline_keeps_insertion_order() {
        let mut queue = TimerQueue::new();
        let first = TimedEvent::EffectExpired {
            effect: Effect::Ghost,
            generation: 4,
        };
        queue.schedule(50, first);
        queue.schedule(50, TimedEvent::Shrink);
        assert_eq!(queue.pop_due(50), Some(first));
        assert_eq!(queue.pop_due(50), Some(TimedEvent::Shrink));
    }
}
