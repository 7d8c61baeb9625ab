pub mod email;
pub mod jwt;
pub mod media;
pub mod password;
pub mod security;
