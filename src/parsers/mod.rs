pub mod express;
pub mod plain;
