pub mod admin;
pub mod content;
pub mod crm;
pub mod lead;
