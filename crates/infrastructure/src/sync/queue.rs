//! Lock-free multi-producer / multi-consumer FIFO.
//!
//! Michael–Scott singly linked list with a sentinel node. `head` and `tail`
//! are advanced independently with compare-and-swap; a producer that finds
//! the tail's data slot already claimed helps link the successor and advance
//! the tail before retrying, so no producer can stall the others.
//!
//! Reclamation uses split reference counting. Each link slot (`head`, `tail`,
//! `Node::next`) stores an external count packed next to the pointer in one
//! 64-bit word so both move under a single CAS; each node carries an internal
//! count plus the number of live link slots. A node is freed when both reach
//! zero. Counts are maintained modulo 2^16: the free test only fires after
//! both link references are gone, at which point the true count equals the
//! number of in-flight accessors (far below 2^16), so the wrapped value is
//! exact.

use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicU32, AtomicU64, Ordering};

// A counted link packs a 16-bit external count above a 48-bit pointer
// (canonical userspace addresses on x86-64 and aarch64).
const EXTERNAL_UNIT: u64 = 1 << 48;
const PTR_MASK: u64 = EXTERNAL_UNIT - 1;

#[cfg(not(target_pointer_width = "64"))]
compile_error!("the counted-link packing requires 64-bit pointers");

fn pack_link<T>(external: u16, node: *mut Node<T>) -> u64 {
    debug_assert_eq!(node as u64 & !PTR_MASK, 0);
    (u64::from(external) << 48) | node as u64
}

fn link_ptr<T>(link: u64) -> *mut Node<T> {
    (link & PTR_MASK) as *mut Node<T>
}

fn link_external(link: u64) -> u16 {
    (link >> 48) as u16
}

// Per-node counter: internal count (high half, modulo 2^16) and the number
// of link slots still referencing the node (low half, starts at 2: once the
// tail, once the head).
const LINK_SLOTS: u16 = 2;

fn pack_count(internal: u16, slots: u16) -> u32 {
    (u32::from(internal) << 16) | u32::from(slots)
}

fn count_internal(count: u32) -> u16 {
    (count >> 16) as u16
}

fn count_slots(count: u32) -> u16 {
    count as u16
}

struct Node<T> {
    data: AtomicPtr<T>,
    next: AtomicU64,
    count: AtomicU32,
}

impl<T> Node<T> {
    fn new() -> Node<T> {
        Node {
            data: AtomicPtr::new(ptr::null_mut()),
            next: AtomicU64::new(0),
            count: AtomicU32::new(pack_count(0, LINK_SLOTS)),
        }
    }
}

/// Drops one internal reference; frees the node when it was the last
/// reference of either kind.
unsafe fn release_ref<T>(node: *mut Node<T>) {
    let mut old = (*node).count.load(Ordering::Relaxed);
    loop {
        let new = pack_count(count_internal(old).wrapping_sub(1), count_slots(old));
        match (*node)
            .count
            .compare_exchange_weak(old, new, Ordering::AcqRel, Ordering::Relaxed)
        {
            Ok(_) => {
                if new == 0 {
                    drop(Box::from_raw(node));
                }
                return;
            }
            Err(actual) => old = actual,
        }
    }
}

/// Retires a counted link the calling thread owns: folds its accumulated
/// external count into the node's internal count and drops one link slot.
/// The caller's own reference is consumed here, so it must not also call
/// `release_ref`.
unsafe fn free_external_count<T>(link: u64) {
    let node = link_ptr::<T>(link);
    let folded = link_external(link).wrapping_sub(2);
    let mut old = (*node).count.load(Ordering::Relaxed);
    loop {
        let new = pack_count(
            count_internal(old).wrapping_add(folded),
            count_slots(old) - 1,
        );
        match (*node)
            .count
            .compare_exchange_weak(old, new, Ordering::AcqRel, Ordering::Relaxed)
        {
            Ok(_) => {
                if new == 0 {
                    drop(Box::from_raw(node));
                }
                return;
            }
            Err(actual) => old = actual,
        }
    }
}

/// Takes a counted reference on whatever `slot` currently points at. On
/// return `expected` holds the incremented link, which pins the node until
/// the matching `release_ref` / `free_external_count`.
fn acquire_link(slot: &AtomicU64, expected: &mut u64) {
    loop {
        let new = expected.wrapping_add(EXTERNAL_UNIT);
        match slot.compare_exchange_weak(*expected, new, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => {
                *expected = new;
                return;
            }
            Err(actual) => *expected = actual,
        }
    }
}

/// Unbounded MPMC FIFO. `enqueue` never blocks on consumers and completes in
/// a bounded number of retries per contending producer; `dequeue` is
/// non-blocking and returns `None` on an empty queue. Elements are delivered
/// exactly once; per-producer order is preserved under any consumer count.
pub struct LockFreeQueue<T> {
    head: AtomicU64,
    tail: AtomicU64,
    _owns: PhantomData<T>,
}

unsafe impl<T: Send> Send for LockFreeQueue<T> {}
unsafe impl<T: Send> Sync for LockFreeQueue<T> {}

impl<T> LockFreeQueue<T> {
    pub fn new() -> LockFreeQueue<T> {
        let sentinel: *mut Node<T> = Box::into_raw(Box::new(Node::new()));
        LockFreeQueue {
            head: AtomicU64::new(pack_link(1, sentinel)),
            tail: AtomicU64::new(pack_link(1, sentinel)),
            _owns: PhantomData,
        }
    }

    pub fn enqueue(&self, value: T) {
        let data = Box::into_raw(Box::new(value));
        let mut spare: *mut Node<T> = Box::into_raw(Box::new(Node::new()));
        let mut old_tail = self.tail.load(Ordering::Relaxed);
        loop {
            acquire_link(&self.tail, &mut old_tail);
            let tail_ptr = link_ptr::<T>(old_tail);
            unsafe {
                if (*tail_ptr)
                    .data
                    .compare_exchange(ptr::null_mut(), data, Ordering::AcqRel, Ordering::Relaxed)
                    .is_ok()
                {
                    // We own the slot. Link our spare node, or adopt the one
                    // a helping producer already linked.
                    let mut new_next = pack_link(1, spare);
                    if let Err(linked) = (*tail_ptr).next.compare_exchange(
                        0,
                        new_next,
                        Ordering::AcqRel,
                        Ordering::Relaxed,
                    ) {
                        drop(Box::from_raw(spare));
                        new_next = linked;
                    }
                    self.set_new_tail(&mut old_tail, new_next);
                    return;
                }

                // Another producer owns the slot but has not advanced the
                // tail yet: help it along, then retry from the new tail.
                let next = match (*tail_ptr).next.compare_exchange(
                    0,
                    pack_link(1, spare),
                    Ordering::AcqRel,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        let donated = pack_link(1, spare);
                        spare = Box::into_raw(Box::new(Node::new()));
                        donated
                    }
                    Err(linked) => linked,
                };
                self.set_new_tail(&mut old_tail, next);
            }
        }
    }

    pub fn dequeue(&self) -> Option<T> {
        let mut old_head = self.head.load(Ordering::Relaxed);
        loop {
            acquire_link(&self.head, &mut old_head);
            let head_ptr = link_ptr::<T>(old_head);
            unsafe {
                if head_ptr == link_ptr::<T>(self.tail.load(Ordering::Acquire)) {
                    release_ref(head_ptr);
                    return None;
                }
                // head != tail, so this node's data slot was claimed before
                // the tail moved past it.
                let next = (*head_ptr).next.load(Ordering::Acquire);
                match self
                    .head
                    .compare_exchange(old_head, next, Ordering::AcqRel, Ordering::Relaxed)
                {
                    Ok(_) => {
                        let data = (*head_ptr).data.swap(ptr::null_mut(), Ordering::AcqRel);
                        free_external_count::<T>(old_head);
                        return Some(*Box::from_raw(data));
                    }
                    Err(actual) => {
                        release_ref(head_ptr);
                        old_head = actual;
                    }
                }
            }
        }
    }

    /// Swings the tail from `old_tail` to `new_tail`, tolerating another
    /// thread having done it first.
    fn set_new_tail(&self, old_tail: &mut u64, new_tail: u64) {
        let claimed = link_ptr::<T>(*old_tail);
        loop {
            match self.tail.compare_exchange_weak(
                *old_tail,
                new_tail,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    unsafe { free_external_count::<T>(*old_tail) };
                    return;
                }
                Err(actual) => {
                    if link_ptr::<T>(actual) != claimed {
                        // Someone else advanced the tail; drop our reference.
                        unsafe { release_ref(claimed) };
                        return;
                    }
                    *old_tail = actual;
                }
            }
        }
    }
}

impl<T> Default for LockFreeQueue<T> {
    fn default() -> Self {
        LockFreeQueue::new()
    }
}

impl<T> Drop for LockFreeQueue<T> {
    fn drop(&mut self) {
        // Exclusive access: walk the list, dropping payloads and nodes.
        let mut node = link_ptr::<T>(*self.head.get_mut());
        while !node.is_null() {
            unsafe {
                let next = link_ptr::<T>(*(*node).next.get_mut());
                let data = *(*node).data.get_mut();
                if !data.is_null() {
                    drop(Box::from_raw(data));
                }
                drop(Box::from_raw(node));
                node = next;
            }
        }
    }
}
