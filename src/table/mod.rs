//! The chained hash table mapping a 4-code-point context to its rule.
//!
//! This is an internal building block of [`crate::model::Model`]; it is not
//! part of the crate's public surface (the model is the facade). A rule
//! inlines its first continuation directly in the record and spills the
//! rest into fixed-capacity overflow nodes, matching the memory profile of
//! the system this crate reimplements: most contexts observed in real text
//! have exactly one or two continuations.

use crate::error::Error;
use alloc::boxed::Box;
use alloc::vec::Vec;

/// Bucket count is clamped to `2^bucket_bits`; this is the valid range for
/// `bucket_bits` at construction.
pub const MIN_BUCKET_BITS: u32 = 1;
pub const MAX_BUCKET_BITS: u32 = 24;

const OVERFLOW_CAPACITY: usize = 4;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

fn fnv1a32(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for &b in bytes {
        hash ^= b as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// XOR-fold a 32-bit hash down to `bits` bits, by repeatedly shifting the
/// high half down by `bits` and XORing it into the low half.
fn fold(mut hash: u32, bits: u32) -> u32 {
    if bits >= 32 {
        return hash;
    }
    let mask = 0xFFFF_FFFFu32 << bits;
    let mut width = 32u32;
    while width > bits {
        let lower = hash & !mask;
        let higher = hash & mask;
        hash = (higher >> bits) ^ lower;
        width -= bits;
    }
    hash
}

#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct NameBytes([u32; 4]);

fn hash_name(name: &[u32; 4], bucket_bits: u32) -> usize {
    let wrapped = NameBytes(*name);
    fold(fnv1a32(bytemuck::bytes_of(&wrapped)), bucket_bits) as usize
}

/// A (code point, weight) pair attached to a [`Rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Continuation {
    pub ch: u32,
    pub weight: u32,
}

struct OverflowNode {
    slots: [Option<Continuation>; OVERFLOW_CAPACITY],
}

impl OverflowNode {
    fn empty() -> Self {
        Self {
            slots: [None; OVERFLOW_CAPACITY],
        }
    }
}

/// The statistics collected for one 4-code-point context.
pub struct Rule {
    pub name: [u32; 4],
    pub weight_total: u64,
    inline: Option<Continuation>,
    overflow: Vec<OverflowNode>,
    next: Option<Box<Rule>>,
}

impl Rule {
    fn new(name: [u32; 4]) -> Self {
        Self {
            name,
            weight_total: 0,
            inline: None,
            overflow: Vec::new(),
            next: None,
        }
    }

    /// Iterate this rule's continuations in insertion order: the inline
    /// slot first, then each overflow node's slots in order.
    pub fn continuations(&self) -> impl Iterator<Item = &Continuation> {
        self.inline.iter().chain(
            self.overflow
                .iter()
                .flat_map(|node| node.slots.iter().filter_map(|s| s.as_ref())),
        )
    }

    fn find_mut(&mut self, ch: u32) -> Option<&mut Continuation> {
        if let Some(c) = &mut self.inline {
            if c.ch == ch {
                return Some(c);
            }
        }
        for node in &mut self.overflow {
            for slot in &mut node.slots {
                if let Some(c) = slot {
                    if c.ch == ch {
                        return Some(c);
                    }
                }
            }
        }
        None
    }

    fn push_new(&mut self, ch: u32) -> Result<&mut Continuation, Error> {
        if self.inline.is_none() {
            self.inline = Some(Continuation { ch, weight: 0 });
            return Ok(self.inline.as_mut().unwrap());
        }
        for node_idx in 0..self.overflow.len() {
            if let Some(slot_idx) = self.overflow[node_idx]
                .slots
                .iter()
                .position(|s| s.is_none())
            {
                self.overflow[node_idx].slots[slot_idx] = Some(Continuation { ch, weight: 0 });
                return Ok(self.overflow[node_idx].slots[slot_idx].as_mut().unwrap());
            }
        }
        self.overflow
            .try_reserve(1)
            .map_err(|_| Error::OutOfMemory)?;
        let mut node = OverflowNode::empty();
        node.slots[0] = Some(Continuation { ch, weight: 0 });
        self.overflow.push(node);
        Ok(self.overflow.last_mut().unwrap().slots[0].as_mut().unwrap())
    }

    /// Merge `weight` into the continuation for `ch` (creating it with that
    /// weight if absent) and add it to `weight_total`.
    pub(crate) fn add_weight(&mut self, ch: u32, weight: u32) -> Result<(), Error> {
        if let Some(c) = self.find_mut(ch) {
            c.weight = c.weight.saturating_add(weight);
        } else {
            let c = self.push_new(ch)?;
            c.weight = weight;
        }
        self.weight_total = self.weight_total.saturating_add(weight as u64);
        Ok(())
    }

    /// Record one observation of `ch` following this rule's context.
    pub fn associate(&mut self, ch: u32) -> Result<(), Error> {
        self.add_weight(ch, 1)
    }
}

/// A chained hash table of `2^bucket_bits` buckets, each a singly linked
/// chain of [`Rule`]s.
pub struct ContextTable {
    buckets: Vec<Option<Box<Rule>>>,
    bucket_bits: u32,
    rule_count: usize,
}

impl ContextTable {
    /// Create an empty table with `2^bucket_bits` buckets.
    ///
    /// `bucket_bits` must be in `[MIN_BUCKET_BITS, MAX_BUCKET_BITS]`, or this
    /// returns `Err(Error::InvalidBucketBits)`.
    pub fn new(bucket_bits: u32) -> Result<Self, Error> {
        if !(MIN_BUCKET_BITS..=MAX_BUCKET_BITS).contains(&bucket_bits) {
            return Err(Error::InvalidBucketBits(bucket_bits));
        }
        let n = 1usize << bucket_bits;
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(n).map_err(|_| Error::OutOfMemory)?;
        buckets.resize_with(n, || None);
        Ok(Self {
            buckets,
            bucket_bits,
            rule_count: 0,
        })
    }

    #[inline]
    fn bucket_index(&self, name: &[u32; 4]) -> usize {
        hash_name(name, self.bucket_bits)
    }

    /// Find the rule for `name`, if one has been observed.
    pub fn lookup(&self, name: &[u32; 4]) -> Option<&Rule> {
        let idx = self.bucket_index(name);
        let mut cur = self.buckets[idx].as_deref();
        while let Some(rule) = cur {
            if &rule.name == name {
                return Some(rule);
            }
            cur = rule.next.as_deref();
        }
        None
    }

    /// Find the rule for `name`, creating an empty one (prepended to its
    /// bucket's chain) if none exists yet.
    pub fn lookup_or_create(&mut self, name: [u32; 4]) -> Result<&mut Rule, Error> {
        let idx = self.bucket_index(&name);
        let mut slot = &mut self.buckets[idx];
        while let Some(rule) = slot {
            if rule.name == name {
                return Ok(rule);
            }
            slot = &mut rule.next;
        }
        *slot = Some(Box::new(Rule::new(name)));
        self.rule_count += 1;
        Ok(slot.as_mut().unwrap())
    }

    /// Number of distinct contexts observed.
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    /// Number of buckets (`2^bucket_bits`).
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket_bits(&self) -> u32 {
        self.bucket_bits
    }

    /// Iterate every rule exactly once, in bucket-then-chain order. Stable
    /// within a process run; used by [`crate::binary::save`].
    pub fn iter_rules(&self) -> impl Iterator<Item = &Rule> {
        self.buckets.iter().flat_map(|bucket| RuleChainIter {
            cur: bucket.as_deref(),
        })
    }

    /// Approximate heap usage in bytes: the bucket array plus each rule and
    /// overflow node reachable from it.
    pub fn heap_size(&self) -> usize {
        let buckets = self.buckets.len() * core::mem::size_of::<Option<Box<Rule>>>();
        let rules: usize = self
            .iter_rules()
            .map(|r| {
                core::mem::size_of::<Rule>()
                    + r.overflow.len() * core::mem::size_of::<OverflowNode>()
            })
            .sum();
        buckets + rules
    }
}

struct RuleChainIter<'a> {
    cur: Option<&'a Rule>,
}

impl<'a> Iterator for RuleChainIter<'a> {
    type Item = &'a Rule;

    fn next(&mut self) -> Option<&'a Rule> {
        let rule = self.cur?;
        self.cur = rule.next.as_deref();
        Some(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_narrows_to_requested_width() {
        for bits in 1..=24u32 {
            let folded = fold(0xDEAD_BEEF, bits);
            assert!(folded < (1u64 << bits) as u32);
        }
    }

    #[test]
    fn rejects_out_of_range_bucket_bits() {
        assert!(matches!(
            ContextTable::new(0),
            Err(Error::InvalidBucketBits(0))
        ));
        assert!(matches!(
            ContextTable::new(25),
            Err(Error::InvalidBucketBits(25))
        ));
        assert!(ContextTable::new(1).is_ok());
        assert!(ContextTable::new(24).is_ok());
    }

    #[test]
    fn lookup_or_create_is_idempotent() {
        let mut table = ContextTable::new(8).unwrap();
        let name = [1, 2, 3, 4];
        table.lookup_or_create(name).unwrap().associate(b'x' as u32).unwrap();
        assert_eq!(table.rule_count(), 1);
        table.lookup_or_create(name).unwrap().associate(b'y' as u32).unwrap();
        assert_eq!(table.rule_count(), 1);
        let rule = table.lookup(&name).unwrap();
        assert_eq!(rule.weight_total, 2);
        assert_eq!(rule.continuations().count(), 2);
    }

    #[test]
    fn distinct_names_get_distinct_rules() {
        let mut table = ContextTable::new(4).unwrap();
        table.lookup_or_create([0, 0, 0, 0]).unwrap();
        table.lookup_or_create([1, 0, 0, 0]).unwrap();
        table.lookup_or_create([0, 0, 0, 1]).unwrap();
        assert_eq!(table.rule_count(), 3);
        assert_eq!(table.iter_rules().count(), 3);
    }

    #[test]
    fn associate_merges_repeated_characters() {
        let mut table = ContextTable::new(4).unwrap();
        let name = [0, 0, 0, b'a' as u32];
        for _ in 0..5 {
            table.lookup_or_create(name).unwrap().associate(b'b' as u32).unwrap();
        }
        let rule = table.lookup(&name).unwrap();
        assert_eq!(rule.weight_total, 5);
        let conts: Vec<_> = rule.continuations().collect();
        assert_eq!(conts.len(), 1);
        assert_eq!(conts[0].weight, 5);
    }

    #[test]
    fn overflow_beyond_inline_and_one_node() {
        let mut table = ContextTable::new(4).unwrap();
        let name = [0, 0, 0, 0];
        let rule = table.lookup_or_create(name).unwrap();
        // inline + 4 overflow slots in the first node + 1 more forcing a second node
        for ch in 0..6u32 {
            rule.associate(ch + 1).unwrap();
        }
        assert_eq!(rule.continuations().count(), 6);
        assert_eq!(rule.weight_total, 6);
        assert_eq!(rule.overflow.len(), 2);
    }

    #[test]
    fn hash_is_deterministic() {
        let t1 = ContextTable::new(10).unwrap();
        let t2 = ContextTable::new(10).unwrap();
        let name = [7, 8, 9, 10];
        assert_eq!(t1.bucket_index(&name), t2.bucket_index(&name));
    }

    #[test]
    fn no_two_continuations_share_a_character() {
        let mut table = ContextTable::new(4).unwrap();
        let name = [0, 0, 0, 0];
        let rule = table.lookup_or_create(name).unwrap();
        for _ in 0..3 {
            rule.associate(b'z' as u32).unwrap();
        }
        rule.associate(b'y' as u32).unwrap();
        let chars: Vec<u32> = rule.continuations().map(|c| c.ch).collect();
        let mut seen = alloc::collections::BTreeSet::new();
        for ch in chars {
            assert!(seen.insert(ch), "duplicate continuation character {}", ch);
        }
    }
}
