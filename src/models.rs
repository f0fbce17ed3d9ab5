pub mod access;
pub mod appointment;
pub mod booking;
pub mod catalog;
pub mod finance;
pub mod schedule;
