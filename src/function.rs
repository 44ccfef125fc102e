//! Sparse vector-valued polynomial functions over GF(2).
//!
//! A [`Function`] maps `input_length` bits to `output_length` bits and is
//! stored as two co-indexed arrays: the monomials of the polynomial and,
//! for each monomial, the mask of output bits it contributes to. On input
//! `v` the function evaluates to the XOR of the contributions of every
//! monomial whose variables are all set in `v`.
//!
//! Functions are immutable; every operation yields a new `Function` in
//! canonical form (distinct monomials, no all-zero contribution).

use log::debug;
use rayon::prelude::*;

use crate::bitvec::BitVec;
use crate::compose::Composer;
use crate::map::MonomialMap;
use crate::monomial::Monomial;
use crate::pool::WorkerPool;

/// A vector-valued Boolean polynomial function over GF(2).
#[derive(Clone, Debug)]
pub struct Function {
    input_length: usize,
    output_length: usize,
    monomials: Vec<Monomial>,
    contributions: Vec<BitVec>,
}

impl Function {
    /// Builds a function from monomials and their contributions.
    ///
    /// The input is canonicalized: duplicate monomials are xor-merged and
    /// entries whose contribution cancels to zero are dropped.
    ///
    /// # Panics
    ///
    /// Panics if the arrays are not co-indexed, a monomial does not range
    /// over `input_length` variables, or a contribution does not have
    /// `output_length` bits.
    pub fn new(
        input_length: usize,
        output_length: usize,
        monomials: Vec<Monomial>,
        contributions: Vec<BitVec>,
    ) -> Self {
        assert_eq!(
            monomials.len(),
            contributions.len(),
            "Monomials and contributions must be co-indexed"
        );
        for m in &monomials {
            assert_eq!(
                m.input_length(),
                input_length,
                "Monomial length must match the input length"
            );
        }
        let map = MonomialMap::from_monomials_and_contributions(
            &monomials,
            &contributions,
            output_length,
        );
        Self::from_monomial_contribution_map(input_length, output_length, map)
    }

    /// Builds a function from a canonicalizing [`MonomialMap`].
    ///
    /// Nil contributions are dropped; the remaining entries become the
    /// canonical arrays. Monomial order in the arrays is unspecified.
    ///
    /// # Panics
    ///
    /// Panics if the map's output length is not `output_length` or a key
    /// does not range over `input_length` variables.
    pub fn from_monomial_contribution_map(
        input_length: usize,
        output_length: usize,
        map: MonomialMap,
    ) -> Self {
        assert_eq!(
            map.output_length(),
            output_length,
            "Map output length must match the function output length"
        );
        let (monomials, contributions) = map.into_parts();
        for m in &monomials {
            assert_eq!(
                m.input_length(),
                input_length,
                "Monomial length must match the input length"
            );
        }
        Self::from_canonical(input_length, output_length, monomials, contributions)
    }

    /// Trusted constructor for arrays already in canonical form.
    fn from_canonical(
        input_length: usize,
        output_length: usize,
        monomials: Vec<Monomial>,
        contributions: Vec<BitVec>,
    ) -> Self {
        Self {
            input_length,
            output_length,
            monomials,
            contributions,
        }
    }

    /// The identity truncated to output bits `start..=stop`: output bit `j`
    /// equals input bit `start + j`.
    ///
    /// # Panics
    ///
    /// Panics unless `start <= stop < input_length`.
    pub fn truncated_identity(start: usize, stop: usize, input_length: usize) -> Self {
        assert!(start <= stop, "Truncation range must not be empty");
        assert!(stop < input_length, "Truncation range must fit the input");
        let output_length = stop - start + 1;
        let mut monomials = Vec::with_capacity(output_length);
        let mut contributions = Vec::with_capacity(output_length);
        for j in 0..output_length {
            monomials.push(Monomial::linear(input_length, start + j));
            let mut contribution = BitVec::new(output_length);
            contribution.set(j);
            contributions.push(contribution);
        }
        Self::from_canonical(input_length, output_length, monomials, contributions)
    }

    /// The full identity on `input_length` bits.
    pub fn identity(input_length: usize) -> Self {
        assert!(input_length > 0, "Identity needs at least one input bit");
        Self::truncated_identity(0, input_length - 1, input_length)
    }

    /// Stacks the outputs of two functions over the same input: the result
    /// computes `lhs(v) || rhs(v)` with `lhs` in the low output bits.
    ///
    /// # Panics
    ///
    /// Panics if the input lengths differ.
    pub fn concatenate(lhs: &Self, rhs: &Self) -> Self {
        assert_eq!(
            lhs.input_length, rhs.input_length,
            "Concatenated functions must have the same input length"
        );
        let output_length = lhs.output_length + rhs.output_length;
        let mut map = MonomialMap::new(output_length);
        for (m, c) in lhs.monomials.iter().zip(&lhs.contributions) {
            map.xor_into(m, &c.resized(output_length));
        }
        for (m, c) in rhs.monomials.iter().zip(&rhs.contributions) {
            map.xor_into(m, &c.shifted(output_length, lhs.output_length));
        }
        Self::from_monomial_contribution_map(lhs.input_length, output_length, map)
    }

    pub fn input_length(&self) -> usize {
        self.input_length
    }

    pub fn output_length(&self) -> usize {
        self.output_length
    }

    /// Number of distinct monomials in the canonical representation.
    pub fn monomial_count(&self) -> usize {
        self.monomials.len()
    }

    /// Read-only view of the monomials.
    pub fn monomials(&self) -> &[Monomial] {
        &self.monomials
    }

    /// Read-only view of the contributions.
    pub fn contributions(&self) -> &[BitVec] {
        &self.contributions
    }

    /// Total monomial count over all output bits: the sum of contribution
    /// cardinalities.
    pub fn total_monomial_count(&self) -> usize {
        self.contributions.iter().map(|c| c.cardinality()).sum()
    }

    /// The largest monomial order (degree) in the function, 0 if it has no
    /// monomials.
    pub fn maximum_monomial_order(&self) -> usize {
        self.monomials.iter().map(|m| m.order()).max().unwrap_or(0)
    }

    /// Evaluates the function on an input.
    ///
    /// # Panics
    ///
    /// Panics if `input.len()` differs from the input length.
    pub fn apply(&self, input: &BitVec) -> BitVec {
        assert_eq!(
            input.len(),
            self.input_length,
            "Input length must match the function input length"
        );
        let mut result = BitVec::new(self.output_length);
        for (m, c) in self.monomials.iter().zip(&self.contributions) {
            if m.eval(input) {
                result ^= c;
            }
        }
        result
    }

    /// Evaluates the function on the concatenation `lhs || rhs`.
    pub fn apply_two(&self, lhs: &BitVec, rhs: &BitVec) -> BitVec {
        self.apply(&BitVec::concatenate(lhs, rhs))
    }

    /// Evaluates the function on the given pool, chunking the monomials
    /// across workers and XOR-reducing the partial results.
    ///
    /// The reducer is commutative and associative, so the result is
    /// identical to [`apply`](Self::apply).
    pub fn apply_parallel(&self, input: &BitVec, pool: &WorkerPool) -> BitVec {
        assert_eq!(
            input.len(),
            self.input_length,
            "Input length must match the function input length"
        );
        pool.install(|| {
            self.monomials
                .par_iter()
                .zip(self.contributions.par_iter())
                .filter(|(m, _)| m.eval(input))
                .fold(
                    || BitVec::new(self.output_length),
                    |mut acc, (_, c)| {
                        acc ^= c;
                        acc
                    },
                )
                .reduce(
                    || BitVec::new(self.output_length),
                    |mut lhs, rhs| {
                        lhs ^= &rhs;
                        lhs
                    },
                )
        })
    }

    /// Pointwise sum (XOR) of two functions.
    ///
    /// # Panics
    ///
    /// Panics if the input or output lengths differ.
    pub fn xor(&self, rhs: &Self) -> Self {
        assert_eq!(
            self.input_length, rhs.input_length,
            "Function being added must have the same input length"
        );
        assert_eq!(
            self.output_length, rhs.output_length,
            "Function being added must have the same output length"
        );
        let mut map = MonomialMap::from_monomials_and_contributions(
            &self.monomials,
            &self.contributions,
            self.output_length,
        );
        for (m, c) in rhs.monomials.iter().zip(&rhs.contributions) {
            map.xor_into(m, c);
        }
        Self::from_monomial_contribution_map(self.input_length, self.output_length, map)
    }

    /// Pointwise product (AND) of two functions: the convolution of the two
    /// sparse polynomials in the monomial basis.
    ///
    /// # Panics
    ///
    /// Panics if the input or output lengths differ.
    pub fn and(&self, rhs: &Self) -> Self {
        assert_eq!(
            self.input_length, rhs.input_length,
            "Functions must have the same input length"
        );
        assert_eq!(
            self.output_length, rhs.output_length,
            "Functions must have the same output length"
        );
        debug!(
            "and: {} x {} monomial pairs",
            self.monomials.len(),
            rhs.monomials.len()
        );
        let mut map = MonomialMap::new(self.output_length);
        for (m, c) in self.monomials.iter().zip(&self.contributions) {
            for (rm, rc) in rhs.monomials.iter().zip(&rhs.contributions) {
                let mut contribution = c.clone();
                contribution &= rc;
                if !contribution.is_zero() {
                    map.xor_into(&m.product(rm), &contribution);
                }
            }
        }
        Self::from_monomial_contribution_map(self.input_length, self.output_length, map)
    }

    /// Symbolic composition `self ∘ inner` using a default worker pool.
    ///
    /// See [`Composer`] to compose on an injected pool.
    ///
    /// # Panics
    ///
    /// Panics if `self.input_length() != inner.output_length()`, or on a
    /// composition failure (an internal invariant violation).
    pub fn compose(&self, inner: &Self) -> Self {
        Composer::new().compose(self, inner)
    }

    /// Composes `self` with the concatenation of two functions:
    /// `self ∘ (lhs || rhs)`.
    pub fn compose_two(&self, lhs: &Self, rhs: &Self) -> Self {
        self.compose(&Self::concatenate(lhs, rhs))
    }

    /// Widens a function to `new_length` input and output bits by
    /// zero-extending monomial supports and contributions.
    ///
    /// On inputs whose added high bits are zero, the low output bits agree
    /// with the original function.
    ///
    /// # Panics
    ///
    /// Panics if `new_length` is smaller than either current length.
    pub fn extend(&self, new_length: usize) -> Self {
        assert!(
            new_length >= self.input_length && new_length >= self.output_length,
            "Extension must not shrink the function"
        );
        let monomials = self.monomials.iter().map(|m| m.extended(new_length)).collect();
        let contributions = self.contributions.iter().map(|c| c.resized(new_length)).collect();
        Self::from_canonical(new_length, new_length, monomials, contributions)
    }

    /// Prepares this function as the left operand of a binary op over a
    /// doubled input: supports are zero-extended so the function reads the
    /// low half of the combined input. Contributions are unchanged.
    pub fn prepare_for_lhs(&self) -> Self {
        let doubled = self.input_length * 2;
        let monomials = self.monomials.iter().map(|m| m.extended(doubled)).collect();
        Self::from_canonical(doubled, self.output_length, monomials, self.contributions.clone())
    }

    /// Prepares this function as the right operand of a binary op over a
    /// doubled input: supports are shifted up so the function reads the
    /// high half of the combined input. Contributions are unchanged.
    pub fn prepare_for_rhs(&self) -> Self {
        let doubled = self.input_length * 2;
        let monomials = self
            .monomials
            .iter()
            .map(|m| m.shifted(doubled, self.input_length))
            .collect();
        Self::from_canonical(doubled, self.output_length, monomials, self.contributions.clone())
    }
}

/// Incremental constructor for [`Function`].
///
/// Contributions added under the same monomial are xor-merged, and entries
/// that cancel to zero are dropped at `build` time, so the result is always
/// canonical.
#[derive(Debug)]
pub struct Builder {
    input_length: usize,
    map: MonomialMap,
}

impl Builder {
    pub fn new(input_length: usize, output_length: usize) -> Self {
        Self {
            input_length,
            map: MonomialMap::new(output_length),
        }
    }

    /// Adds a term.
    ///
    /// # Panics
    ///
    /// Panics if the monomial or contribution length does not match.
    pub fn add(mut self, monomial: Monomial, contribution: BitVec) -> Self {
        assert_eq!(
            monomial.input_length(),
            self.input_length,
            "Monomial length must match the input length"
        );
        self.map.xor_into(&monomial, &contribution);
        self
    }

    pub fn build(self) -> Function {
        let output_length = self.map.output_length();
        Function::from_monomial_contribution_map(self.input_length, output_length, self.map)
    }
}
