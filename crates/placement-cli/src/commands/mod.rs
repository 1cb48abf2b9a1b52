pub mod account;
pub mod catalog;
pub mod position_documents;
pub mod students;
