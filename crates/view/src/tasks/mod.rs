#![forbid(unsafe_code)]

mod load;
mod save;
