pub mod disk;
pub mod retry;
pub mod validation;
