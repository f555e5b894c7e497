use thiserror::Error;

#[derive(Debug, Error)]
pub enum LightwireError {
    #[error("lightbox widget is not available")]
    WidgetMissing,

    #[error("embedded lightbox settings are not available")]
    SettingsMissing,

    #[error("failed to parse embedded lightbox settings: {0}")]
    SettingsInvalid(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LightwireError>;
