//! # Credex Math
//!
//! Numerical building blocks for the Credex ISDA CDS analytics library.
//!
//! This crate provides:
//!
//! - **Epsilon functions**: Stable evaluation of `(e^x - 1)/x` and its first
//!   two derivatives, the kernels of every leg integral in the ISDA model
//! - **Solvers**: Root-finding algorithms (Brent, Newton-Raphson) and root
//!   bracketing
//!
//! ## Design Philosophy
//!
//! - **Bit-stable**: Thresholds and series truncations are fixed constants so
//!   that prices reproduce across platforms
//! - **Total functions**: The epsilon family is defined for every finite input,
//!   including zero
//! - **Explicit failure**: Solvers report bracketing and convergence failures
//!   instead of returning a best guess

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::doc_markdown)]

pub mod epsilon;
pub mod error;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::epsilon::{epsilon, epsilon_p, epsilon_pp, EPSILON_SWITCH};
    pub use crate::error::{MathError, MathResult};
    pub use crate::solvers::{
        bracket_root, brent, newton_raphson, newton_raphson_fdf, BracketConfig, SolverConfig,
        SolverResult,
    };
}

pub use error::{MathError, MathResult};
