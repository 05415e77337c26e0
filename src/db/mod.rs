pub mod apps;
pub mod audit;
pub mod catalog;
pub mod environment_variables;
pub mod projects;
pub mod repo;
pub mod users;
