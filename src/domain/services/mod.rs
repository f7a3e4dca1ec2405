pub mod admission;
pub mod confirmation;
pub mod lifecycle;
pub mod scheduling;
