use std::sync::Arc;

use crate::pipeline::UploadPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<UploadPipeline>,
    /// Schema preselected in the upload form and used when none is posted
    pub default_schema: String,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: UploadPipeline, default_schema: impl Into<String>, max_upload_bytes: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            default_schema: default_schema.into(),
            max_upload_bytes,
        }
    }
}
