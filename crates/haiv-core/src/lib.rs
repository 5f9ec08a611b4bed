// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Haiv credential security core.
//!
//! Holds the error taxonomy shared by the crypto, storage, bootstrap, and
//! CLI crates so that every layer fails with the same vocabulary.

pub mod error;

pub use error::HaivError;
