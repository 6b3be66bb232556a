pub mod db;
pub mod mapping;
