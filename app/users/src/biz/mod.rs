mod models;
mod user_usecase;
pub mod validator;

pub use models::{NewUser, User, UserCandidate};
pub use user_usecase::{UserRepo, UserUseCase};
pub use validator::FieldError;
