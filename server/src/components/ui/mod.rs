pub mod alert;
pub mod badge;
pub mod button;
pub mod heading;
