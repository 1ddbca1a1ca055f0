//! Toast XML payload
//!
//! Text only ever reaches the document as character data through the XML
//! writer, which does all escaping.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::warn;

use crate::core::request::{AudioSetting, Category, NotificationRequest};
use crate::error::{ToastError, ToastResult};

/// Legacy toast templates, chosen by which optional parts are present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastTemplate {
    Text01,
    Text02,
    ImageAndText01,
    ImageAndText02,
}

impl ToastTemplate {
    pub fn select(has_image: bool, has_title: bool) -> Self {
        match (has_image, has_title) {
            (false, false) => ToastTemplate::Text01,
            (false, true) => ToastTemplate::Text02,
            (true, false) => ToastTemplate::ImageAndText01,
            (true, true) => ToastTemplate::ImageAndText02,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ToastTemplate::Text01 => "ToastText01",
            ToastTemplate::Text02 => "ToastText02",
            ToastTemplate::ImageAndText01 => "ToastImageAndText01",
            ToastTemplate::ImageAndText02 => "ToastImageAndText02",
        }
    }
}

/// Rendered toast document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastPayload {
    template: ToastTemplate,
    xml: String,
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> ToastResult<()> {
    writer
        .write_event(event)
        .map_err(|e| ToastError::Payload(e.to_string()))
}

fn text_element(writer: &mut Writer<Vec<u8>>, id: &str, value: &str) -> ToastResult<()> {
    let mut start = BytesStart::new("text");
    start.push_attribute(("id", id));
    emit(writer, Event::Start(start))?;
    emit(writer, Event::Text(BytesText::new(value)))?;
    emit(writer, Event::End(BytesEnd::new("text")))
}

impl ToastPayload {
    /// Render `request` into toast XML.
    pub fn build(request: &NotificationRequest) -> ToastResult<Self> {
        let icon_uri = request.icon.as_ref().and_then(|icon| match icon.path().file_uri() {
            Ok(uri) => Some(uri),
            Err(e) => {
                warn!("Cannot form URI for icon {:?}: {}; showing without it", icon.path().as_str(), e);
                None
            }
        });

        let template = ToastTemplate::select(icon_uri.is_some(), request.title.is_some());
        let mut writer = Writer::new(Vec::new());

        let mut toast = BytesStart::new("toast");
        if let Some(scenario) = request.category.scenario() {
            toast.push_attribute(("scenario", scenario));
        }
        if request.category == Category::Reminder {
            toast.push_attribute(("duration", "long"));
        }
        emit(&mut writer, Event::Start(toast))?;
        emit(&mut writer, Event::Start(BytesStart::new("visual")))?;

        let mut binding = BytesStart::new("binding");
        binding.push_attribute(("template", template.name()));
        emit(&mut writer, Event::Start(binding))?;

        if let Some(uri) = &icon_uri {
            let mut image = BytesStart::new("image");
            image.push_attribute(("id", "1"));
            image.push_attribute(("src", uri.as_str()));
            emit(&mut writer, Event::Empty(image))?;
        }

        match &request.title {
            Some(title) => {
                text_element(&mut writer, "1", title.as_str())?;
                text_element(&mut writer, "2", request.message.as_str())?;
            }
            None => text_element(&mut writer, "1", request.message.as_str())?,
        }

        emit(&mut writer, Event::End(BytesEnd::new("binding")))?;
        emit(&mut writer, Event::End(BytesEnd::new("visual")))?;

        let mut audio = BytesStart::new("audio");
        match request.audio_setting() {
            AudioSetting::Default => {}
            AudioSetting::Silent => audio.push_attribute(("silent", "true")),
            AudioSetting::Custom(asset) => match asset.path().file_uri() {
                Ok(uri) => audio.push_attribute(("src", uri.as_str())),
                Err(e) => {
                    warn!("Cannot form URI for audio {:?}: {}; muting", asset.path().as_str(), e);
                    audio.push_attribute(("silent", "true"));
                }
            },
        }
        emit(&mut writer, Event::Empty(audio))?;
        emit(&mut writer, Event::End(BytesEnd::new("toast")))?;

        let xml = String::from_utf8(writer.into_inner()).map_err(|e| ToastError::Payload(e.to_string()))?;
        Ok(Self { template, xml })
    }

    pub fn template(&self) -> ToastTemplate {
        self.template
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AssetLimits;
    use crate::core::request::{RawRequest, RequestGuard};
    use crate::security::sniffer::test_support::{MemoryAssets, MINIMAL_PNG, MINIMAL_WAV};
    use crate::security::PathPolicy;

    fn assets() -> MemoryAssets {
        MemoryAssets::default()
            .with(r"C:\icons\app.png", &MINIMAL_PNG)
            .with(r"C:\My Sounds\ding.wav", &MINIMAL_WAV)
            .with(r"C:\sound.wav", b"plain ascii, not a wave file")
    }

    fn build(raw: RawRequest) -> ToastPayload {
        let guard = RequestGuard::new(PathPolicy::builtin(), AssetLimits::default());
        let request = guard.prepare(&raw, &assets()).unwrap();
        ToastPayload::build(&request).unwrap()
    }

    fn raw() -> RawRequest {
        RawRequest {
            message: "Hello World".into(),
            source: "MyApp".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_message_only() {
        let payload = build(raw());
        assert_eq!(payload.template(), ToastTemplate::Text01);
        assert_eq!(
            payload.xml(),
            r#"<toast><visual><binding template="ToastText01"><text id="1">Hello World</text></binding></visual><audio/></toast>"#
        );
    }

    #[test]
    fn test_title_and_message() {
        let payload = build(RawRequest {
            title: Some("Greeting".into()),
            ..raw()
        });
        assert_eq!(payload.template(), ToastTemplate::Text02);
        assert!(payload
            .xml()
            .contains(r#"<text id="1">Greeting</text><text id="2">Hello World</text>"#));
    }

    #[test]
    fn test_markup_is_escaped() {
        let payload = build(RawRequest {
            message: "<script>alert(1)</script> & more".into(),
            ..raw()
        });
        assert!(payload.xml().contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; more"));
        assert!(!payload.xml().contains("<script>"));
    }

    #[test]
    fn test_injection_cannot_close_elements() {
        let payload = build(RawRequest {
            message: r#"</text></binding><image src="file:///C:/x.png"/>"#.into(),
            ..raw()
        });
        assert_eq!(payload.xml().matches("</text>").count(), 1);
        assert!(!payload.xml().contains("<image"));
    }

    #[test]
    fn test_icon_selects_image_template() {
        let payload = build(RawRequest {
            icon: Some(r"C:\icons\app.png".into()),
            ..raw()
        });
        assert_eq!(payload.template(), ToastTemplate::ImageAndText01);
        assert!(payload.xml().contains(r#"<image id="1" src="file:///C:/icons/app.png"/>"#));

        let payload = build(RawRequest {
            icon: Some(r"C:\icons\app.png".into()),
            title: Some("T".into()),
            ..raw()
        });
        assert_eq!(payload.template(), ToastTemplate::ImageAndText02);
    }

    #[test]
    fn test_missing_icon_falls_back_to_text_template() {
        let payload = build(RawRequest {
            icon: Some(r"C:\icons\missing.png".into()),
            ..raw()
        });
        assert_eq!(payload.template(), ToastTemplate::Text01);
        assert!(!payload.xml().contains("<image"));
    }

    #[test]
    fn test_custom_audio() {
        let payload = build(RawRequest {
            audio: Some(r"C:\My Sounds\ding.wav".into()),
            ..raw()
        });
        assert!(payload.xml().contains(r#"<audio src="file:///C:/My%20Sounds/ding.wav"/>"#));
    }

    #[test]
    fn test_text_file_audio_is_silent() {
        let payload = build(RawRequest {
            audio: Some(r"C:\sound.wav".into()),
            ..raw()
        });
        assert!(payload.xml().contains(r#"<audio silent="true"/>"#));
    }

    #[test]
    fn test_muted_overrides_audio() {
        let payload = build(RawRequest {
            audio: Some(r"C:\My Sounds\ding.wav".into()),
            muted: true,
            ..raw()
        });
        assert!(payload.xml().contains(r#"<audio silent="true"/>"#));
        assert!(!payload.xml().contains("src="));
    }

    #[test]
    fn test_scenarios() {
        let payload = build(RawRequest {
            category: Category::Reminder,
            ..raw()
        });
        assert!(payload.xml().starts_with(r#"<toast scenario="reminder" duration="long">"#));

        let payload = build(RawRequest {
            category: Category::IncomingCall,
            ..raw()
        });
        assert!(payload.xml().starts_with(r#"<toast scenario="incomingCall">"#));

        let payload = build(RawRequest {
            category: Category::Alarm,
            ..raw()
        });
        assert!(!payload.xml().contains("duration"));
    }
}
