#![allow(missing_docs)]

pub mod test_utils;
