pub mod rss;
pub mod videos;
pub mod init;
pub mod housekeeping;
