pub mod table;
pub mod view_models;
