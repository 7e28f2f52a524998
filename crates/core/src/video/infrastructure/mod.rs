pub mod ffmpeg_capture_source;
pub mod image_file_writer;
pub mod still_image_source;
