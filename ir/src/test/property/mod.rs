//! Property-based tests for affine folding and interpreter arithmetic.

#[cfg(test)]
mod affine_props;
#[cfg(test)]
mod value_props;
