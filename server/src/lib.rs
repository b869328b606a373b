pub mod components;
pub mod cookies;
pub mod errors;
pub mod forms;
pub mod outcome;
pub mod profile;
pub mod routes;
pub mod server;
pub mod session;
pub mod setup;
pub mod state;
pub mod supabase;
