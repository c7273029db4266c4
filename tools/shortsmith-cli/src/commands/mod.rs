pub mod caption_video;
pub mod captions;
pub mod check;
pub mod config;
pub mod create;
pub mod layout;
pub mod script;
