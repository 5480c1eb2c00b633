pub mod admin;
pub mod claim;
pub mod epoch;
pub mod lock;
pub mod vote;
