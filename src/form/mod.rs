//! Configurable registration form engine.
//!
//! A [`FormSchema`](crate::models::FormSchema) is rendered into controls, edited one key at a
//! time, validated, and maintained by administrators through the [`FormBuilder`].

mod builder;
mod render;
mod validate;
mod values;

pub use builder::*;
pub use render::*;
pub use validate::*;
pub use values::*;
