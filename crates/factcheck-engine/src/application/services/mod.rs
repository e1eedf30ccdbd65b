pub mod evaluator;
pub mod verification_service;
