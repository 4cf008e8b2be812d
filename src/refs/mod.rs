//! Code supporting the `refs *` sub commands.

pub mod normalize;
