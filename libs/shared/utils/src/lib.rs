pub mod jwt;
pub mod validation;
pub mod test_utils;
