pub mod greeting;
pub mod guild;
pub mod members;
pub mod messages;
