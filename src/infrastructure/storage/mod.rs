//! Non-SQL storage backends

pub mod memory;

pub use memory::InMemoryUserRepository;
