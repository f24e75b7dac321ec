//! Application services — use-case implementations.
//!
//! Each service struct accepts a shared [`UnitOfWork`](crate::unit_of_work::UnitOfWork)
//! over a port trait implementation (constructor injection), keeping this
//! layer decoupled from concrete adapters.

pub mod device_service;
pub mod room_service;
