pub mod input_bar;
pub mod message_list;
pub mod notices;
pub mod photo_picker;
pub mod sign_in;
