//! Property-based tests for promotion and reduction synthesis.

mod promote_props;
