pub mod allowance;
pub mod chain;
pub mod config;
pub mod confirm;
pub mod consts;
pub mod contracts;
pub mod errors;
pub mod executor;
pub mod pair;
pub mod reserves;
pub mod swap;
pub mod token;
