pub mod character_processor;
pub mod character_profiles;
pub mod character_scorer;
pub mod question_catalogue;
