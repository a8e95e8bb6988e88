//! Core operations and types for verifying modifications of an AVL+ authenticated dictionary.
//!
//! This crate defines the label schema of the tree and the verification of single-key modify
//! proofs in a backend-agnostic manner.
//!
//! The core types and proof verification routines of this crate do not require the
//! standard library, but do require Rust's alloc crate.

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

pub mod hasher;
pub mod modification;
pub mod proof;
pub mod tree;
