pub mod crypto;
pub mod format;
pub mod token;
pub mod validation;
