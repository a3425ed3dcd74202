pub mod backend;
pub mod db;
pub mod index;
pub mod memory;
pub mod messaging;
