//! End-to-end tests for the polynomial function engine.
//!
//! Covers the literal construction/algebra/composition scenarios and the
//! algebraic laws the engine guarantees, checked on seeded random functions.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use anf_rs::bitvec::BitVec;
use anf_rs::function::{Builder, Function};
use anf_rs::monomial::Monomial;
use anf_rs::pool::WorkerPool;

/// Parses a conventional binary numeral (rightmost char is bit 0).
fn bits(s: &str) -> BitVec {
    let mut bv = BitVec::new(s.len());
    for (i, ch) in s.chars().rev().enumerate() {
        if ch == '1' {
            bv.set(i);
        }
    }
    bv
}

fn random_input(rng: &mut ChaCha8Rng, len: usize) -> BitVec {
    let mut v = BitVec::new(len);
    for i in 0..len {
        if rng.gen_bool(0.5) {
            v.set(i);
        }
    }
    v
}

fn random_nonzero(rng: &mut ChaCha8Rng, len: usize) -> BitVec {
    loop {
        let v = random_input(rng, len);
        if !v.is_zero() {
            return v;
        }
    }
}

/// A random function with roughly `terms` monomials of order at most
/// `max_order` (duplicates cancel during canonicalization).
fn random_function(
    rng: &mut ChaCha8Rng,
    input_length: usize,
    output_length: usize,
    terms: usize,
    max_order: usize,
) -> Function {
    let mut builder = Builder::new(input_length, output_length);
    for _ in 0..terms {
        let order = rng.gen_range(0..=max_order);
        let support: Vec<usize> = rand::seq::index::sample(rng, input_length, order).into_vec();
        let monomial = Monomial::from_support(input_length, &support);
        builder = builder.add(monomial, random_nonzero(rng, output_length));
    }
    builder.build()
}

fn assert_canonical(f: &Function) {
    assert_eq!(f.monomials().len(), f.contributions().len());
    let distinct: std::collections::HashSet<_> = f.monomials().iter().collect();
    assert_eq!(distinct.len(), f.monomials().len(), "duplicate monomial");
    for c in f.contributions() {
        assert!(!c.is_zero(), "nil contribution survived");
    }
}

// ─── Literal Scenarios ─────────────────────────────────────────────────────────

#[test]
fn identity_compose() {
    let f = Function::truncated_identity(0, 3, 4);
    let g = Function::truncated_identity(0, 3, 4);
    assert_eq!(f.compose(&g).apply(&bits("1011")), bits("1011"));
}

#[test]
fn xor_of_constants_cancels() {
    let f = Builder::new(4, 4)
        .add(Monomial::constant(4), bits("1111"))
        .build();
    let g = Builder::new(4, 4)
        .add(Monomial::constant(4), bits("1111"))
        .build();
    let sum = f.xor(&g);
    assert_eq!(sum.monomial_count(), 0);
    assert_eq!(sum.apply(&bits("0110")), bits("0000"));
    assert_eq!(sum.apply(&bits("1111")), bits("0000"));
}

#[test]
fn and_of_single_linear_monomials() {
    let f = Builder::new(4, 4)
        .add(Monomial::linear(4, 0), bits("0001"))
        .build();
    let g = Builder::new(4, 4)
        .add(Monomial::linear(4, 1), bits("0001"))
        .build();
    let h = f.and(&g);
    assert_eq!(h.monomial_count(), 1);
    assert_eq!(h.monomials()[0], Monomial::from_support(4, &[0, 1]));
    assert_eq!(h.contributions()[0], bits("0001"));
    assert_eq!(h.apply(&bits("0011")), bits("0001"));
    assert_eq!(h.apply(&bits("0010")), bits("0000"));
}

#[test]
fn quadratic_composition() {
    // outer(y0, y1) = y0*y1; inner(x0, x1, x2) = (x0 ^ x2, x1).
    let outer = Builder::new(2, 1)
        .add(Monomial::from_support(2, &[0, 1]), bits("1"))
        .build();
    let inner = Builder::new(3, 2)
        .add(Monomial::linear(3, 0), bits("01"))
        .add(Monomial::linear(3, 2), bits("01"))
        .add(Monomial::linear(3, 1), bits("10"))
        .build();

    let h = outer.compose(&inner);
    let monomials: std::collections::HashSet<_> = h.monomials().iter().cloned().collect();
    assert!(monomials.contains(&Monomial::from_support(3, &[0, 1])));
    assert!(monomials.contains(&Monomial::from_support(3, &[1, 2])));
    assert_eq!(monomials.len(), 2);

    assert_eq!(h.apply(&bits("111")), bits("0"));
    assert_eq!(h.apply(&bits("110")), bits("1"));
    assert_eq!(h.apply(&bits("011")), bits("1"));
}

#[test]
fn nil_cancellation() {
    let f = Builder::new(4, 4)
        .add(Monomial::linear(4, 0), bits("0101"))
        .add(Monomial::linear(4, 0), bits("0101"))
        .build();
    assert_eq!(f.monomial_count(), 0);
}

#[test]
fn extend_doubles_width() {
    let f = Builder::new(4, 4)
        .add(Monomial::linear(4, 1), bits("0001"))
        .build();
    let wide = f.extend(8);
    assert_eq!(wide.input_length(), 8);
    assert_eq!(wide.apply(&bits("00000010")), bits("00000001"));
    assert_eq!(wide.apply(&bits("00100000")), bits("00000000"));
}

// ─── Algebraic Laws ────────────────────────────────────────────────────────────

#[test]
fn xor_evaluation_homomorphism() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for _ in 0..20 {
        let f = random_function(&mut rng, 6, 5, 7, 3);
        let g = random_function(&mut rng, 6, 5, 7, 3);
        let sum = f.xor(&g);
        assert!(sum.monomial_count() <= f.monomial_count() + g.monomial_count());
        for _ in 0..10 {
            let v = random_input(&mut rng, 6);
            let mut expected = f.apply(&v);
            expected ^= &g.apply(&v);
            assert_eq!(sum.apply(&v), expected);
        }
    }
}

#[test]
fn and_pointwise_product() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    for _ in 0..20 {
        let f = random_function(&mut rng, 6, 5, 6, 2);
        let g = random_function(&mut rng, 6, 5, 6, 2);
        let prod = f.and(&g);
        for _ in 0..10 {
            let v = random_input(&mut rng, 6);
            let mut expected = f.apply(&v);
            expected &= &g.apply(&v);
            assert_eq!(prod.apply(&v), expected);
        }
    }
}

#[test]
fn compose_evaluation() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for _ in 0..10 {
        let inner = random_function(&mut rng, 5, 4, 6, 2);
        let outer = random_function(&mut rng, 4, 3, 5, 3);
        let h = outer.compose(&inner);
        assert_eq!(h.input_length(), 5);
        assert_eq!(h.output_length(), 3);
        assert_canonical(&h);
        for _ in 0..16 {
            let v = random_input(&mut rng, 5);
            assert_eq!(h.apply(&v), outer.apply(&inner.apply(&v)), "input {}", v);
        }
    }
}

#[test]
fn xor_associativity() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    for _ in 0..10 {
        let f = random_function(&mut rng, 6, 4, 6, 3);
        let g = random_function(&mut rng, 6, 4, 6, 3);
        let h = random_function(&mut rng, 6, 4, 6, 3);
        let left = f.xor(&g).xor(&h);
        let right = f.xor(&g.xor(&h));
        for _ in 0..16 {
            let v = random_input(&mut rng, 6);
            assert_eq!(left.apply(&v), right.apply(&v));
        }
    }
}

#[test]
fn canonical_form_after_operations() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for _ in 0..10 {
        let f = random_function(&mut rng, 5, 4, 8, 3);
        let g = random_function(&mut rng, 5, 4, 8, 3);
        assert_canonical(&f);
        assert_canonical(&f.xor(&g));
        assert_canonical(&f.and(&g));
        let inner = random_function(&mut rng, 4, 5, 6, 2);
        assert_canonical(&f.compose(&inner));
    }
}

#[test]
fn monomial_counters() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    for _ in 0..10 {
        let f = random_function(&mut rng, 6, 5, 8, 4);
        let total: usize = f.contributions().iter().map(|c| c.cardinality()).sum();
        assert_eq!(f.total_monomial_count(), total);
        let max = f.monomials().iter().map(|m| m.order()).max().unwrap_or(0);
        assert_eq!(f.maximum_monomial_order(), max);
    }
}

#[test]
fn truncated_identity_slices_input() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let f = Function::truncated_identity(2, 5, 8);
    for _ in 0..20 {
        let v = random_input(&mut rng, 8);
        let out = f.apply(&v);
        assert_eq!(out.len(), 4);
        for j in 0..4 {
            assert_eq!(out.get(j), v.get(2 + j));
        }
    }
}

#[test]
fn extend_preserves_low_half() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    for _ in 0..10 {
        let f = random_function(&mut rng, 4, 4, 6, 3);
        let wide = f.extend(8);
        for _ in 0..10 {
            let v = random_input(&mut rng, 4);
            assert_eq!(wide.apply(&v.resized(8)), f.apply(&v).resized(8));
        }
    }
}

#[test]
fn parallel_apply_matches_sequential() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let pool = WorkerPool::new(4);
    for _ in 0..10 {
        let f = random_function(&mut rng, 8, 6, 12, 4);
        for _ in 0..10 {
            let v = random_input(&mut rng, 8);
            assert_eq!(f.apply_parallel(&v, &pool), f.apply(&v));
        }
    }
}

#[test]
fn compose_two_concatenates_inner() {
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    for _ in 0..5 {
        let lhs = random_function(&mut rng, 4, 2, 5, 2);
        let rhs = random_function(&mut rng, 4, 2, 5, 2);
        let outer = random_function(&mut rng, 4, 3, 5, 2);
        let h = outer.compose_two(&lhs, &rhs);
        assert_eq!(h.input_length(), 4);
        for _ in 0..16 {
            let v = random_input(&mut rng, 4);
            let expected = outer.apply_two(&lhs.apply(&v), &rhs.apply(&v));
            assert_eq!(h.apply(&v), expected, "input {}", v);
        }
    }
}
