//! Monomial-to-contribution maps.
//!
//! [`MonomialMap`] is the mutable scratchpad behind XOR, AND and
//! composition: contributions are xor-merged under their monomial, and the
//! map is converted back to canonical parallel arrays by dropping every
//! entry whose contribution cancelled to zero.

use std::collections::{HashMap, HashSet};

use crate::bitvec::BitVec;
use crate::monomial::Monomial;

/// Whether a contribution actually contributes to any output bit.
#[inline]
fn is_nil(contribution: &BitVec) -> bool {
    contribution.is_zero()
}

/// A map from [`Monomial`] to its contribution vector.
#[derive(Clone, Debug)]
pub struct MonomialMap {
    output_length: usize,
    entries: HashMap<Monomial, BitVec>,
}

impl MonomialMap {
    /// Creates an empty map whose contributions have the given length.
    pub fn new(output_length: usize) -> Self {
        Self {
            output_length,
            entries: HashMap::new(),
        }
    }

    /// Copies parallel arrays into a fresh map, xor-merging duplicates.
    ///
    /// # Panics
    ///
    /// Panics if the arrays are not co-indexed.
    pub fn from_monomials_and_contributions(
        monomials: &[Monomial],
        contributions: &[BitVec],
        output_length: usize,
    ) -> Self {
        assert_eq!(
            monomials.len(),
            contributions.len(),
            "Monomials and contributions must be co-indexed"
        );
        let mut map = Self::new(output_length);
        for (m, c) in monomials.iter().zip(contributions) {
            map.xor_into(m, c);
        }
        map
    }

    pub fn output_length(&self) -> usize {
        self.output_length
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, monomial: &Monomial) -> Option<&BitVec> {
        self.entries.get(monomial)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Monomial, &BitVec)> {
        self.entries.iter()
    }

    /// XORs `contribution` into the entry for `monomial`, inserting a zero
    /// vector if absent.
    ///
    /// # Panics
    ///
    /// Panics if `contribution.len()` differs from the map's output length.
    pub fn xor_into(&mut self, monomial: &Monomial, contribution: &BitVec) {
        assert_eq!(
            contribution.len(),
            self.output_length,
            "Contribution length must match the output length"
        );
        let entry = self
            .entries
            .entry(monomial.clone())
            .or_insert_with(|| BitVec::new(self.output_length));
        *entry ^= contribution;
    }

    /// Sets output bit `row` in the entry for `monomial`, inserting a zero
    /// vector if absent.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    pub fn set_bit(&mut self, monomial: &Monomial, row: usize) {
        assert!(row < self.output_length, "Output row out of range");
        self.entries
            .entry(monomial.clone())
            .or_insert_with(|| BitVec::new(self.output_length))
            .set(row);
    }

    /// Drops every entry whose contribution is all-zero.
    pub fn remove_nil_contributions(&mut self) {
        self.entries.retain(|_, c| !is_nil(c));
    }

    /// Returns a copy of the map without its nil-contribution entries.
    pub fn filter_nil_contributions(&self) -> Self {
        Self {
            output_length: self.output_length,
            entries: self
                .iter()
                .filter(|(_, c)| !is_nil(c))
                .map(|(m, c)| (m.clone(), c.clone()))
                .collect(),
        }
    }

    /// Converts the map into canonical parallel arrays, dropping nil
    /// contributions.
    pub fn into_parts(mut self) -> (Vec<Monomial>, Vec<BitVec>) {
        self.remove_nil_contributions();
        self.entries.into_iter().unzip()
    }
}

/// Collects the monomials contributing to output bit `row` into a set.
///
/// This is the polynomial producing that output bit, viewed as a set of
/// monomial supports.
///
/// # Panics
///
/// Panics if the arrays are not co-indexed.
pub fn contributions_to_monomials(
    row: usize,
    monomials: &[Monomial],
    contributions: &[BitVec],
) -> HashSet<Monomial> {
    assert_eq!(
        monomials.len(),
        contributions.len(),
        "Monomials and contributions must be co-indexed"
    );
    monomials
        .iter()
        .zip(contributions)
        .filter(|(_, c)| c.get(row))
        .map(|(m, _)| m.clone())
        .collect()
}
