//! Notification request pipeline
//!
//! Runs every raw field through its validator. Text and path violations are
//! fatal for the whole request; an asset that validates but is missing or has
//! the wrong content only drops out of the notification.

use std::ffi::OsStr;

use tracing::{debug, warn};

use super::config::{AssetLimits, ToastConfig};
use crate::error::ToastError;
use crate::security::text::{MAX_MESSAGE_LENGTH, MAX_SOURCE_LENGTH, MAX_TITLE_LENGTH};
use crate::security::{sanitize, AssetFile, AssetKind, AssetSource, PathPolicy, SanitizedText, ValidationError};

/// Longest accepted command line: argument lengths plus one separator each
pub const MAX_COMMAND_LINE: usize = 1965;

/// Notification category, mapped to the toast `scenario`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Category {
    #[default]
    Default,
    Alarm,
    Reminder,
    #[value(name = "incomingcall", alias = "incoming-call")]
    IncomingCall,
    Urgent,
}

impl Category {
    pub fn scenario(self) -> Option<&'static str> {
        match self {
            Category::Default => None,
            Category::Alarm => Some("alarm"),
            Category::Reminder => Some("reminder"),
            Category::IncomingCall => Some("incomingCall"),
            Category::Urgent => Some("urgent"),
        }
    }
}

/// Field values exactly as they arrived on the command line
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub message: String,
    pub source: String,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub audio: Option<String>,
    pub muted: bool,
    pub category: Category,
}

/// A fully validated request, ready for the payload builder
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub message: SanitizedText,
    pub title: Option<SanitizedText>,
    pub source: SanitizedText,
    pub icon: Option<AssetFile>,
    pub audio: Option<AssetFile>,
    /// An audio path was supplied and passed validation, whether or not the
    /// file itself survived
    pub audio_requested: bool,
    pub muted: bool,
    pub category: Category,
}

/// What the toast does for sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSetting<'a> {
    /// System default sound
    Default,
    Silent,
    Custom(&'a AssetFile),
}

impl NotificationRequest {
    /// Muted or a requested sound that dropped out means silence; no request
    /// means the system sound.
    pub fn audio_setting(&self) -> AudioSetting<'_> {
        if self.muted {
            return AudioSetting::Silent;
        }
        match (&self.audio, self.audio_requested) {
            (Some(asset), _) => AudioSetting::Custom(asset),
            (None, true) => AudioSetting::Silent,
            (None, false) => AudioSetting::Default,
        }
    }
}

/// Validates raw requests against a deny-list and asset limits
#[derive(Debug, Clone)]
pub struct RequestGuard {
    policy: PathPolicy,
    limits: AssetLimits,
}

impl Default for RequestGuard {
    fn default() -> Self {
        Self::new(PathPolicy::default(), AssetLimits::default())
    }
}

impl RequestGuard {
    pub fn new(policy: PathPolicy, limits: AssetLimits) -> Self {
        Self { policy, limits }
    }

    pub fn from_config(config: &ToastConfig) -> Self {
        Self::new(config.path_policy(), config.assets)
    }

    pub fn policy(&self) -> &PathPolicy {
        &self.policy
    }

    /// Validate every field of `raw`, reading assets through `source`.
    pub fn prepare<S: AssetSource + ?Sized>(
        &self,
        raw: &RawRequest,
        source: &S,
    ) -> Result<NotificationRequest, ValidationError> {
        let message = sanitize(&raw.message, MAX_MESSAGE_LENGTH, "message")?;
        let title = raw
            .title
            .as_deref()
            .map(|title| sanitize(title, MAX_TITLE_LENGTH, "title"))
            .transpose()?;
        let app = sanitize(&raw.source, MAX_SOURCE_LENGTH, "source")?;

        // Both paths are checked before any file is touched.
        let icon_path = match raw.icon.as_deref() {
            Some(input) => self.policy.validate(input, "icon", AssetKind::Image)?,
            None => None,
        };
        let audio_path = match raw.audio.as_deref() {
            Some(input) => self.policy.validate(input, "audio", AssetKind::Audio)?,
            None => None,
        };

        let icon = icon_path.and_then(|path| {
            let shown = path.to_string();
            let asset = AssetFile::probe(path, source, self.limits.ceiling(AssetKind::Image));
            if asset.is_none() {
                warn!("Icon {:?} is missing or not a PNG; showing without it", shown);
            }
            asset
        });

        let audio_requested = audio_path.is_some();
        let audio = match audio_path {
            Some(path) if raw.muted => {
                debug!("Muted; not reading audio {:?}", path.as_str());
                None
            }
            Some(path) => {
                let shown = path.to_string();
                let asset = AssetFile::probe(path, source, self.limits.ceiling(AssetKind::Audio));
                if asset.is_none() {
                    warn!("Audio {:?} is missing or not a WAV; notification will be silent", shown);
                }
                asset
            }
            None => None,
        };

        debug!(
            "Request accepted: title={}, icon={}, audio={}, category={:?}",
            title.is_some(),
            icon.is_some(),
            audio.is_some(),
            raw.category
        );

        Ok(NotificationRequest {
            message,
            title,
            source: app,
            icon,
            audio,
            audio_requested,
            muted: raw.muted,
            category: raw.category,
        })
    }
}

/// Reject command lines longer than [`MAX_COMMAND_LINE`].
///
/// `args` excludes the program name. Lengths are UTF-16 units.
pub fn check_command_line<I, A>(args: I) -> Result<(), ToastError>
where
    I: IntoIterator<Item = A>,
    A: AsRef<OsStr>,
{
    let total: usize = args
        .into_iter()
        .map(|arg| arg.as_ref().to_string_lossy().encode_utf16().count() + 1)
        .sum();
    if total > MAX_COMMAND_LINE {
        return Err(ToastError::CommandLineTooLong { max: MAX_COMMAND_LINE });
    }
    Ok(())
}
