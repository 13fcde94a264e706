pub mod pii;

pub use pii::RedactedId;
