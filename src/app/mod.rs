//! Application module

pub mod cli;
pub mod commands;
pub mod startup;

#[cfg(test)]
mod tests;
