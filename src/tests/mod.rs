#[cfg(test)]
pub mod common;

mod credential_store;
mod tags;
