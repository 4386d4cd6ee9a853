pub mod auth_dto;
pub mod catalog_dto;
pub mod result_dto;
pub mod statistics_dto;
