pub mod file_finder;
pub mod key_archive;
pub mod key_sanitizer;
pub mod response_assembler;
pub mod retry;
pub mod status_store;
pub mod upload_client;

pub use file_finder::FileFinder;
pub use key_archive::KeyArchive;
pub use response_assembler::{AssembledFile, ResponseAssembler, CONTENT_MARKER, KEYS_MARKER};
pub use retry::{retry_on_error, retry_on_rate_limit};
pub use status_store::StatusStore;
pub use upload_client::{UploadClient, UploadResult};
