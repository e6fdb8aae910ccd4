use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlantError>;

#[derive(Error, Debug)]
pub enum PlantError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("invalid color '{0}': expected #RRGGBB")]
    Color(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl PlantError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
