pub(crate) mod builder;
pub mod combinators;
