pub mod category;
pub mod question;
pub mod test;
pub mod test_result;
pub mod user;
