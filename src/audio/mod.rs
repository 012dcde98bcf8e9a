//! Inspection of uploaded recordings before they are handed to transcription.

mod probe;

pub use probe::{probe_file, upload_info, AudioInfo, UploadInfo};
