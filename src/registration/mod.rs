pub mod dto;
pub mod mapper;
pub mod rules;
pub mod service;

pub use dto::{RegisterDto, RegisterForm};
pub use rules::FieldErrors;
pub use service::{RegisterError, RegistrationPreview};
