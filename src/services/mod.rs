pub mod category_service;
pub mod question_service;
pub mod result_service;
pub mod scoring_service;
pub mod statistics_service;
pub mod test_service;
pub mod user_service;
