pub mod index;
pub mod update;
pub mod update_email;
pub mod update_password;
