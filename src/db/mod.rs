pub mod audit;
pub mod companies;
pub mod settings;
pub mod users;
