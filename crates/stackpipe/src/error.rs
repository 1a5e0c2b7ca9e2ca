use stackpipe_core::resource::ResourceType;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{} of {total} resource types failed: {}", .failed.len(), list(.failed))]
    ResourcesFailed {
        failed: Vec<ResourceType>,
        total: usize,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

fn list(resources: &[ResourceType]) -> String {
    resources
        .iter()
        .map(ResourceType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
