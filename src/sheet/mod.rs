//! Code supporting the `sheet *` sub commands.

pub mod expand;
