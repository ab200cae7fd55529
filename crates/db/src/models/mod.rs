pub mod character_result;
pub mod factor;
pub mod quiz_response;
