//! Request id generation

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of ids for outgoing requests
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random lowercase base36 ids, 20 characters by default
#[derive(Debug, Clone)]
pub struct RandomIdGenerator {
    length: usize,
}

impl RandomIdGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new(20)
    }
}

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> String {
        (0..self.length)
            .map(|_| {
                let digit = rand::random::<u32>() % 36;
                char::from_digit(digit, 36).unwrap_or('0')
            })
            .collect()
    }
}

/// Predictable ids, `prefix` followed by a counter starting at 1
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}{}", self.prefix, n)
    }
}
