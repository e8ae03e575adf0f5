pub mod id_generator;
pub mod logger;
pub mod pagination;
pub mod password;
