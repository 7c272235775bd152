pub mod guild;
pub mod message_type;
