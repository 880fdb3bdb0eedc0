//! Decoding, assembling, and simplifying batch payloads.

mod assemble;
mod document;
mod keyed;
mod simplify;

pub use assemble::{AssembledResult, assemble};
pub use document::{Binding, Document, Head, Results, Term, TermKind};
pub use keyed::KeyedResults;
pub use simplify::{Row, SimplifiedResult, Simplify};
