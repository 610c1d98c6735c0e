mod repository;

pub use repository::UserRepoImpl;
