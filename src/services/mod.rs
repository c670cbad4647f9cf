pub mod image_client;
pub mod pipeline;
pub mod prompt;
pub mod watermark;
