#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid planner configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid YAML configuration.")]
    Config(#[from] serde_yaml::Error),
    #[error("Renderer failed to initialize: {0}")]
    RendererInit(String),
    #[error("Failed to render tile {zoom}/{x}/{y}: {reason}")]
    Render {
        zoom: u8,
        x: u32,
        y: u32,
        reason: String,
    },
}
