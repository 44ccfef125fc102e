//! Monomials over GF(2).
//!
//! A monomial is a product of distinct input variables, represented by the
//! bit vector of its support: bit `i` is set iff `x_i` appears. Since
//! `x_i^2 = x_i` over GF(2), multiplication is the idempotent union of
//! supports. The all-zeros monomial is the constant `1`.

use std::fmt;

use crate::bitvec::BitVec;

/// A product of distinct input variables, identified by its support set.
///
/// Equality and hashing treat the packed support words (together with the
/// length) as the identity of the monomial; two monomials over different
/// input widths are never equal. The derived total order over the packed
/// words is used for deterministic tie-breaking in the composition
/// scheduler.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Monomial {
    support: BitVec,
}

impl Monomial {
    /// The constant monomial `1` over `len` variables (empty support).
    pub fn constant(len: usize) -> Self {
        Self { support: BitVec::new(len) }
    }

    /// The linear monomial `x_index` over `len` variables.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn linear(len: usize, index: usize) -> Self {
        let mut support = BitVec::new(len);
        support.set(index);
        Self { support }
    }

    /// A monomial over `len` variables with the given support indices.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn from_support(len: usize, indices: &[usize]) -> Self {
        let mut support = BitVec::new(len);
        for &i in indices {
            support.set(i);
        }
        Self { support }
    }

    /// Number of input variables this monomial ranges over.
    #[inline]
    pub fn input_length(&self) -> usize {
        self.support.len()
    }

    /// The order (degree) of the monomial: the number of variables in it.
    #[inline]
    pub fn order(&self) -> usize {
        self.support.cardinality()
    }

    /// Returns true for the constant monomial `1`.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.support.is_zero()
    }

    /// Read-only view of the support bits.
    #[inline]
    pub fn support(&self) -> &BitVec {
        &self.support
    }

    /// The product of two monomials: the union of their supports.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn product(&self, other: &Self) -> Self {
        let mut support = self.support.clone();
        support |= &other.support;
        Self { support }
    }

    /// Divides this monomial by `other`.
    ///
    /// Present iff `other` is a factor of `self`; the quotient's support is
    /// `support(self) \ support(other)`.
    pub fn divide(&self, other: &Self) -> Option<Self> {
        if self.has_factor(other) {
            Some(Self { support: self.support.and_not(&other.support) })
        } else {
            None
        }
    }

    /// Returns true iff `support(other) ⊆ support(self)`.
    #[inline]
    pub fn has_factor(&self, other: &Self) -> bool {
        self.support.contains_all(&other.support)
    }

    /// The symmetric difference of the two supports.
    pub fn xor(&self, other: &Self) -> Self {
        let mut support = self.support.clone();
        support ^= &other.support;
        Self { support }
    }

    /// Evaluates the monomial on an input: true iff every variable in the
    /// support is set in `input`.
    ///
    /// # Panics
    ///
    /// Panics if `input.len()` differs from the monomial length.
    #[inline]
    pub fn eval(&self, input: &BitVec) -> bool {
        input.contains_all(&self.support)
    }

    /// Zero-extends the support to a wider input.
    ///
    /// # Panics
    ///
    /// Panics if `new_len` is smaller than the current input length.
    pub fn extended(&self, new_len: usize) -> Self {
        Self { support: self.support.resized(new_len) }
    }

    /// Moves the support up by `offset` into a wider input.
    ///
    /// # Panics
    ///
    /// Panics if the shifted support does not fit in `new_len` bits.
    pub fn shifted(&self, new_len: usize, offset: usize) -> Self {
        Self { support: self.support.shifted(new_len, offset) }
    }
}

impl From<BitVec> for Monomial {
    fn from(support: BitVec) -> Self {
        Self { support }
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constant() {
            return write!(f, "1");
        }
        let mut first = true;
        for i in self.support.iter_ones() {
            if !first {
                write!(f, "*")?;
            }
            write!(f, "x{}", i)?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for Monomial {
    // Delegates to Display so logs and assertion failures stay readable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
