//! Hand a payload to the Windows notification center

use crate::core::config::NotificationSettings;
use crate::error::ToastResult;

use super::payload::ToastPayload;

/// Show `payload` as a toast from application `app_id`.
#[cfg(windows)]
pub fn show(payload: &ToastPayload, app_id: &str, settings: &NotificationSettings) -> ToastResult<()> {
    use tracing::info;
    use windows::core::HSTRING;
    use windows::Data::Xml::Dom::XmlDocument;
    use windows::UI::Notifications::{ToastNotification, ToastNotificationManager};

    use crate::error::ToastError;

    let failed = |e: windows::core::Error| ToastError::Display(e.to_string());

    let document = XmlDocument::new().map_err(failed)?;
    document.LoadXml(&HSTRING::from(payload.xml())).map_err(failed)?;

    let toast = ToastNotification::CreateToastNotification(&document).map_err(failed)?;
    toast.SetTag(&HSTRING::from(settings.tag.as_str())).map_err(failed)?;
    toast.SetGroup(&HSTRING::from(settings.group.as_str())).map_err(failed)?;

    let notifier = ToastNotificationManager::CreateToastNotifierWithId(&HSTRING::from(app_id)).map_err(failed)?;
    notifier.Show(&toast).map_err(failed)?;

    info!("Displayed {} toast for {:?}", payload.template().name(), app_id);
    Ok(())
}

/// Toasts are a Windows facility; elsewhere only `--print-xml` works.
#[cfg(not(windows))]
pub fn show(payload: &ToastPayload, app_id: &str, settings: &NotificationSettings) -> ToastResult<()> {
    use crate::error::ToastError;
    use crate::platform;

    let _ = (payload, app_id, settings);
    Err(ToastError::NotSupported(format!(
        "toast notifications cannot be displayed on {}; use --print-xml to inspect the payload",
        platform::platform_name()
    )))
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;
    use crate::core::request::{RawRequest, RequestGuard};
    use crate::error::ToastError;
    use crate::security::sniffer::test_support::MemoryAssets;

    #[test]
    fn test_show_is_unsupported_off_windows() {
        let raw = RawRequest {
            message: "m".into(),
            source: "s".into(),
            ..Default::default()
        };
        let request = RequestGuard::default().prepare(&raw, &MemoryAssets::default()).unwrap();
        let payload = ToastPayload::build(&request).unwrap();
        let err = show(&payload, "s", &NotificationSettings::default()).unwrap_err();
        assert!(matches!(err, ToastError::NotSupported(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
