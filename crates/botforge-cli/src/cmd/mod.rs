pub mod generate;
pub mod init;
pub mod project;
pub mod validate;
