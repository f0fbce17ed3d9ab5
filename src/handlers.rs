// src/handlers.rs

pub mod agenda;
pub mod bookings;
pub mod catalog;
pub mod finance;
