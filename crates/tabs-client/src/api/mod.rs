//! Typed wrappers over the request pipeline, one module per backend
//! resource.

pub mod auth;
pub mod categories;
pub mod expenses;
pub mod profile;
