//! # anf-rs: Boolean polynomial functions over GF(2) in Rust
//!
//! **`anf-rs`** is a symbolic engine for **vector-valued Boolean polynomial
//! functions over GF(2)**: multivariate polynomials whose inputs and outputs
//! are bit vectors, with XOR as addition and AND as multiplication. Such
//! functions are the algebraic substrate of homomorphic-encryption and
//! encrypted-search constructions, where a decryption map expressed as a
//! low-degree polynomial is composed with arbitrary circuits.
//!
//! ## Representation
//!
//! A function is stored sparsely as two co-indexed arrays: the monomials of
//! its algebraic normal form and, per monomial, the mask of output bits it
//! contributes to. The representation is **canonical** --- monomials are
//! distinct and no contribution is all-zero --- so cancellation happens as
//! part of every operation.
//!
//! ## Key Features
//!
//! - **Pointwise algebra**: XOR and AND of functions, computed directly on
//!   the sparse term maps.
//! - **Symbolic composition**: [`Function::compose`][crate::function::Function::compose]
//!   substitutes one function into another, using a greedy factor-sharing
//!   scheduler to reuse partial products instead of expanding each outer
//!   monomial from scratch.
//! - **Bounded parallelism**: composition stages and evaluation can run on
//!   an injected [`WorkerPool`][crate::pool::WorkerPool] with barrier
//!   semantics; results do not depend on scheduling.
//!
//! ## Basic Usage
//!
//! ```rust
//! use anf_rs::bitvec::BitVec;
//! use anf_rs::function::{Builder, Function};
//! use anf_rs::monomial::Monomial;
//!
//! // f(x) = x0*x1 on one output bit
//! let mut contribution = BitVec::new(1);
//! contribution.set(0);
//! let f = Builder::new(2, 1)
//!     .add(Monomial::from_support(2, &[0, 1]), contribution)
//!     .build();
//!
//! // Compose with the identity: g = f
//! let g = f.compose(&Function::identity(2));
//!
//! let mut input = BitVec::new(2);
//! input.set(0);
//! input.set(1);
//! assert!(g.apply(&input).get(0));
//! ```
//!
//! ## Core Components
//!
//! - **[`bitvec`]**: fixed-length packed bit vectors.
//! - **[`monomial`]**: products of input variables, identified by support.
//! - **[`function`]**: the sparse polynomial functions and their algebra.
//! - **[`map`]**: the canonicalizing monomial-to-contribution scratchpad.
//! - **[`compose`]**: the symbolic composition engine.
//! - **[`pool`]**: the bounded worker pool behind the parallel stages.

pub mod bitvec;
pub mod compose;
pub mod function;
pub mod map;
pub mod monomial;
pub mod pool;
