pub mod timezone;

pub use timezone::{kolkata_now, kolkata_now_rfc3339};
