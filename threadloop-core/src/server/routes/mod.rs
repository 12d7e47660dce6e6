pub mod chat;
pub mod health;
pub mod threads;
pub mod tools;
