//! sd-year-summary: which board games the group played on game night, as a static page.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;

#[cfg(test)]
pub(crate) mod test_support;
