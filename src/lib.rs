#![forbid(unsafe_code)]

pub mod cli;
pub mod convert;
pub mod date;
pub mod error;
pub mod export;
pub mod fetch;
pub mod footnotes;
pub mod logging;
pub mod normalize;
pub mod source;
pub mod toc;
pub mod workspace;
