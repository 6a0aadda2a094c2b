//! Word-packed bitsets used by categorical split thresholds.

use crate::core::constants::BITSET_WORD_BITS;

/// Allocate a bitset able to hold `n` bits, all cleared.
pub fn empty_bitset(n: usize) -> Vec<u32> {
    let size = (n + BITSET_WORD_BITS as usize - 1) / BITSET_WORD_BITS as usize;
    vec![0u32; size]
}

/// Set bit `val`, growing the bitset if necessary.
pub fn insert_bitset(bitset: &mut Vec<u32>, val: u32) {
    let i1 = (val / BITSET_WORD_BITS) as usize;
    let i2 = val % BITSET_WORD_BITS;

    if bitset.len() <= i1 {
        bitset.resize(i1 + 1, 0);
    }

    bitset[i1] |= 1u32 << i2;
}

/// Construct a bitset with every listed position set.
pub fn construct_bitset(vals: &[u32]) -> Vec<u32> {
    let num_bits = vals.iter().max().map_or(0, |&max| max as usize + 1);
    let mut bitset = empty_bitset(num_bits);
    for &val in vals {
        insert_bitset(&mut bitset, val);
    }
    bitset
}

/// Test membership of `pos` among the first `num_words` words of `bits`.
///
/// Positions past the end are not members.
#[inline]
pub fn find_in_bitset(bits: &[u32], num_words: usize, pos: u32) -> bool {
    let i1 = (pos / BITSET_WORD_BITS) as usize;
    if i1 >= num_words || i1 >= bits.len() {
        return false;
    }
    let i2 = pos % BITSET_WORD_BITS;
    (bits[i1] >> i2) & 1 != 0
}
