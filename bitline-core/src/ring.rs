//! Receive ring buffer
//!
//! Lock-free single-producer / single-consumer byte ring shared between the
//! receive interrupt and foreground code.
//!
//! # Access rules
//!
//! - `head` (write index) is stored only by [`RxRing::push`], which runs in
//!   the receive interrupt.
//! - `tail` (read index) is stored only by the consumer side: `pop`, `peek`,
//!   `clear`.
//!
//! Both indices run freely and wrap at `usize::MAX`; slots are addressed
//! with `index & (N - 1)`, which is why `N` must be a power of two.
//!
//! # Overflow
//!
//! The producer never waits and never looks at `tail`. When it gets more
//! than `N` bytes ahead, the oldest unread bytes are overwritten. The
//! consumer notices on its next access and skips forward to the oldest byte
//! still in the ring. Nothing reports the loss.

use portable_atomic::{AtomicU8, AtomicUsize, Ordering};

/// Value returned by [`RxRing::pop`] and [`RxRing::peek`] when the ring is empty
pub const EMPTY_SENTINEL: u8 = 0;

/// Fixed-capacity SPSC byte ring
pub struct RxRing<const N: usize> {
    slots: [AtomicU8; N],
    head: AtomicUsize,
    tail: AtomicUsize,
}

impl<const N: usize> Default for RxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RxRing<N> {
    const CAPACITY_IS_POWER_OF_TWO: () = assert!(
        N.is_power_of_two(),
        "RxRing capacity must be a power of two"
    );

    const MASK: usize = N - 1;

    /// Create an empty ring
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_IS_POWER_OF_TWO;

        Self {
            slots: [const { AtomicU8::new(0) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Ring capacity in bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Append a byte (producer side)
    ///
    /// Overwrites the oldest unread byte when the ring is full.
    pub fn push(&self, byte: u8) {
        let head = self.head.load(Ordering::Relaxed);
        self.slots[head & Self::MASK].store(byte, Ordering::Relaxed);
        self.head.store(head.wrapping_add(1), Ordering::Release);
    }

    /// Number of unread bytes (at most `N`)
    pub fn available(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Relaxed);
        head.wrapping_sub(tail).min(N)
    }

    /// Check whether there is nothing to read
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Take the oldest unread byte, or `None` if the ring is empty
    pub fn try_pop(&self) -> Option<u8> {
        let (tail, byte) = self.load_oldest()?;
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Take the oldest unread byte
    ///
    /// Returns [`EMPTY_SENTINEL`] when empty; check [`RxRing::available`]
    /// first if a zero byte must be told apart from "nothing there".
    pub fn pop(&self) -> u8 {
        self.try_pop().unwrap_or(EMPTY_SENTINEL)
    }

    /// Look at the oldest unread byte without consuming it
    pub fn try_peek(&self) -> Option<u8> {
        let (tail, byte) = self.load_oldest()?;
        // Persist any overflow skip so `peek` followed by `pop` agree
        self.tail.store(tail, Ordering::Release);
        Some(byte)
    }

    /// Look at the oldest unread byte, [`EMPTY_SENTINEL`] when empty
    pub fn peek(&self) -> u8 {
        self.try_peek().unwrap_or(EMPTY_SENTINEL)
    }

    /// Discard all unread bytes (consumer side)
    pub fn clear(&self) {
        let head = self.head.load(Ordering::Acquire);
        self.tail.store(head, Ordering::Release);
    }

    /// Read index and value of the oldest byte still in the ring
    ///
    /// Skips over bytes the producer has overwritten. If the producer laps
    /// the slot while it is being read, the load is retried.
    fn load_oldest(&self) -> Option<(usize, u8)> {
        let mut tail = self.tail.load(Ordering::Relaxed);
        loop {
            let head = self.head.load(Ordering::Acquire);
            if head == tail {
                return None;
            }
            if head.wrapping_sub(tail) > N {
                tail = head.wrapping_sub(N);
            }

            let byte = self.slots[tail & Self::MASK].load(Ordering::Relaxed);

            let head_after = self.head.load(Ordering::Acquire);
            if head_after.wrapping_sub(tail) <= N {
                return Some((tail, byte));
            }
        }
    }
}
