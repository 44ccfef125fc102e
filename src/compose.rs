//! Symbolic composition of polynomial functions.
//!
//! Composing `outer ∘ inner` re-expresses every outer monomial as a
//! polynomial in the inner variables: the monomial `∏_{i∈S} x_i` expands to
//! the product of the polynomials producing the inner output bits `i ∈ S`.
//! Expanding each outer monomial independently would repeat enormous
//! amounts of work, so the composer builds the expansions bottom-up:
//!
//! 1. Enumerate candidate products of already-expanded monomials that stay
//!    within the outer degree bound and divide at least one monomial that
//!    still needs expanding. Candidate enumeration is cheap relative to an
//!    actual product computation.
//! 2. Pick the candidate dividing the most outstanding monomials.
//! 3. Compute its expansion from the two memoized factors and memoize it.
//! 4. Repeat until every outer monomial is expanded, then recombine the
//!    expansions into contributions per output bit.
//!
//! Expansions are kept as sets of inner monomials (the support of the
//! polynomial); combining polynomials with XOR is symmetric difference of
//! the sets, and the set product reduces pairwise support unions mod 2.

use std::collections::{HashMap, HashSet};

use log::debug;
use rayon::prelude::*;

use crate::function::Function;
use crate::map::{contributions_to_monomials, MonomialMap};
use crate::monomial::Monomial;
use crate::pool::WorkerPool;

/// The expansion of an outer monomial: the set of inner monomials of the
/// polynomial it denotes over the inner variables.
type Expansion = HashSet<Monomial>;

/// Pairs each candidate product with one witnessing pair of expanded
/// factors.
type Candidates = HashMap<Monomial, (Monomial, Monomial)>;

/// Composes polynomial functions on an injected worker pool.
pub struct Composer {
    pool: WorkerPool,
}

impl Composer {
    /// Creates a composer with a default worker pool.
    pub fn new() -> Self {
        Self {
            pool: WorkerPool::default(),
        }
    }

    /// Creates a composer running its parallel stages on the given pool.
    pub fn with_pool(pool: WorkerPool) -> Self {
        Self { pool }
    }

    /// Computes `outer ∘ inner`: a function `h` over the inner inputs with
    /// `h.apply(v) == outer.apply(inner.apply(v))`, in canonical form.
    ///
    /// # Panics
    ///
    /// Panics if `outer.input_length() != inner.output_length()`, or on a
    /// composition failure (a required monomial whose expansion cannot be
    /// derived, which is an internal invariant violation; do not retry
    /// with the same inputs).
    pub fn compose(&self, outer: &Function, inner: &Function) -> Function {
        assert_eq!(
            outer.input_length(),
            inner.output_length(),
            "Input length of the outer function must match the output length of the inner function"
        );

        let mut expansions = initial_expansions(outer.input_length(), inner);
        let required: HashSet<Monomial> = outer
            .monomials()
            .iter()
            .filter(|m| !m.is_constant())
            .cloned()
            .collect();
        debug!(
            "compose: {} outer monomials, {} inner monomials, degree {}",
            outer.monomial_count(),
            inner.monomial_count(),
            outer.maximum_monomial_order()
        );

        self.expand_required(&mut expansions, &required, outer.maximum_monomial_order());
        recover_stragglers(&mut expansions, &required);

        let rows: Vec<Expansion> = self.pool.install(|| {
            (0..outer.output_length())
                .into_par_iter()
                .map(|row| row_monomials(outer, &expansions, row))
                .collect()
        });

        let mut composed = MonomialMap::new(outer.output_length());
        for (row, monomials) in rows.iter().enumerate() {
            for m in monomials {
                composed.set_bit(m, row);
            }
        }
        Function::from_monomial_contribution_map(
            inner.input_length(),
            outer.output_length(),
            composed,
        )
    }

    /// Greedy scheduler: expands products of already-expanded monomials,
    /// most-shared factors first, until every required monomial has an
    /// expansion or no candidate product remains. Monomials left behind by
    /// an exhausted candidate set go through [`recover_stragglers`].
    fn expand_required(
        &self,
        expansions: &mut HashMap<Monomial, Expansion>,
        required: &HashSet<Monomial>,
        max_order: usize,
    ) {
        let mut missing = required
            .iter()
            .filter(|m| !expansions.contains_key(*m))
            .count();
        if missing == 0 {
            return;
        }

        // Keys are kept in a sorted vector so that candidate enumeration
        // and witness selection are reproducible run to run.
        let mut keys: Vec<Monomial> = expansions.keys().cloned().collect();
        keys.sort_unstable();

        let mut candidates = Candidates::new();
        self.add_candidates(&mut candidates, &keys, &keys, expansions, required, max_order);

        while missing > 0 {
            let (best, score) = match self.most_frequent_factor(&candidates, required) {
                Some(found) => found,
                None => {
                    debug!("candidates exhausted with {} monomials unexpanded", missing);
                    break;
                }
            };
            assert!(
                score > 0,
                "Composition failure: candidate {} divides no required monomial",
                best
            );

            let (a, b) = candidates
                .remove(&best)
                .expect("Selected candidate must be present");
            let product = product_of(&expansions[&a], &expansions[&b]);
            debug!(
                "expand {} = ({}) * ({}): {} inner monomials, covers {}/{} required",
                best,
                a,
                b,
                product.len(),
                score,
                required.len()
            );
            if required.contains(&best) {
                missing -= 1;
            }
            expansions.insert(best.clone(), product);
            keys.push(best.clone());
            self.add_candidates(
                &mut candidates,
                std::slice::from_ref(&best),
                &keys,
                expansions,
                required,
                max_order,
            );
        }
    }

    /// Enumerates products of one monomial from `new_keys` and one from
    /// `all_keys` that (i) stay within the degree bound, (ii) are not yet
    /// expanded, and (iii) divide at least one required monomial. Each
    /// product keeps a single witnessing pair.
    fn add_candidates(
        &self,
        candidates: &mut Candidates,
        new_keys: &[Monomial],
        all_keys: &[Monomial],
        expansions: &HashMap<Monomial, Expansion>,
        required: &HashSet<Monomial>,
        max_order: usize,
    ) {
        let found: Vec<Vec<(Monomial, (Monomial, Monomial))>> = self.pool.install(|| {
            new_keys
                .par_iter()
                .map(|lhs| {
                    let mut local = Vec::new();
                    for rhs in all_keys {
                        if lhs == rhs {
                            continue;
                        }
                        let product = lhs.product(rhs);
                        if product.order() > max_order
                            || expansions.contains_key(&product)
                            || !required.iter().any(|r| r.has_factor(&product))
                        {
                            continue;
                        }
                        local.push((product, (lhs.clone(), rhs.clone())));
                    }
                    local
                })
                .collect()
        });
        for batch in found {
            for (product, pair) in batch {
                candidates.entry(product).or_insert(pair);
            }
        }
    }

    /// Scores every candidate by the number of required monomials it
    /// divides and returns the argmax. Ties break toward the smallest
    /// monomial in the packed-word order, so the greedy choice does not
    /// depend on scheduling.
    fn most_frequent_factor(
        &self,
        candidates: &Candidates,
        required: &HashSet<Monomial>,
    ) -> Option<(Monomial, usize)> {
        self.pool.install(|| {
            candidates
                .par_iter()
                .map(|(candidate, _)| {
                    let count = required.iter().filter(|r| r.has_factor(candidate)).count();
                    (count, candidate)
                })
                .max_by(|(na, ma), (nb, mb)| na.cmp(nb).then_with(|| mb.cmp(ma)))
                .map(|(count, candidate)| (candidate.clone(), count))
        })
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

/// Seeds the expansion memo: each linear outer monomial expands to the
/// inner monomials contributing to that output bit, and the constant
/// monomial expands to the inner constant.
fn initial_expansions(
    outer_input_length: usize,
    inner: &Function,
) -> HashMap<Monomial, Expansion> {
    let mut expansions = HashMap::with_capacity(outer_input_length + 1);
    for i in 0..outer_input_length {
        expansions.insert(
            Monomial::linear(outer_input_length, i),
            contributions_to_monomials(i, inner.monomials(), inner.contributions()),
        );
    }
    let mut constant = Expansion::new();
    constant.insert(Monomial::constant(inner.input_length()));
    expansions.insert(Monomial::constant(outer_input_length), constant);
    expansions
}

/// The product of two expansions: the multiset-xor of all pairwise support
/// unions, i.e. the expansion of the product polynomial reduced mod 2 with
/// idempotent variables.
fn product_of(lhs: &Expansion, rhs: &Expansion) -> Expansion {
    let mut result = Expansion::with_capacity(lhs.len().saturating_mul(rhs.len()) / 2);
    for a in lhs {
        for b in rhs {
            let product = a.product(b);
            if !result.remove(&product) {
                result.insert(product);
            }
        }
    }
    result
}

/// Single-step recovery for monomials the greedy loop left behind when its
/// candidate set ran dry: derive each from an expanded quotient and an
/// expanded required factor.
///
/// # Panics
///
/// Panics if a required monomial still has no derivable expansion.
fn recover_stragglers(expansions: &mut HashMap<Monomial, Expansion>, required: &HashSet<Monomial>) {
    let stragglers: Vec<Monomial> = required
        .iter()
        .filter(|m| !expansions.contains_key(*m))
        .cloned()
        .collect();
    for straggler in stragglers {
        let recovered = required.iter().find_map(|q| {
            let quotient = straggler.divide(q)?;
            match (expansions.get(&quotient), expansions.get(q)) {
                (Some(qe), Some(fe)) => Some(product_of(qe, fe)),
                _ => None,
            }
        });
        match recovered {
            Some(expansion) => {
                debug!("recovered expansion for {}", straggler);
                expansions.insert(straggler, expansion);
            }
            None => panic!(
                "Composition failure: monomial {} has no derivable expansion",
                straggler
            ),
        }
    }
}

/// Accumulates the expansion of output bit `row`: the symmetric difference
/// of the expansions of every outer monomial contributing to that row.
fn row_monomials(
    outer: &Function,
    expansions: &HashMap<Monomial, Expansion>,
    row: usize,
) -> Expansion {
    let mut acc = Expansion::new();
    for (m, c) in outer.monomials().iter().zip(outer.contributions()) {
        if c.get(row) {
            let expansion = expansions.get(m).unwrap_or_else(|| {
                panic!("Composition failure: no expansion for contributing monomial {}", m)
            });
            for inner in expansion {
                if !acc.remove(inner) {
                    acc.insert(inner.clone());
                }
            }
        }
    }
    acc
}
