//! Built-in UI translations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ko")]
    Korean,
}

/// Every user-visible string in the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    Folder,
    Browse,
    Open,
    Images,
    NoImages,
    TargetSize,
    Swap,
    ResizeToTarget,
    Description,
    Save,
    Saving,
    SavedTo,
    DescriptionAttached,
    NoDescription,
    NoSelection,
    InvalidTarget,
    PickImage,
    Language,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Korean];

    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Korean => "한국어",
        }
    }

    pub fn text(&self, text: Text) -> &'static str {
        match self {
            Language::English => english(text),
            Language::Korean => korean(text),
        }
    }
}

fn english(text: Text) -> &'static str {
    match text {
        Text::Folder => "Folder:",
        Text::Browse => "Browse…",
        Text::Open => "Open",
        Text::Images => "Images",
        Text::NoImages => "No images in this folder",
        Text::TargetSize => "Target size:",
        Text::Swap => "Swap width and height",
        Text::ResizeToTarget => "Resize to target",
        Text::Description => "Description",
        Text::Save => "Save",
        Text::Saving => "Saving…",
        Text::SavedTo => "Saved to",
        Text::DescriptionAttached => "description saved",
        Text::NoDescription => "no description",
        Text::NoSelection => "Select an image and a crop area first.",
        Text::InvalidTarget => "Width and height must be positive whole numbers.",
        Text::PickImage => "Pick an image from the list.",
        Text::Language => "Language",
    }
}

fn korean(text: Text) -> &'static str {
    match text {
        Text::Folder => "폴더:",
        Text::Browse => "찾아보기…",
        Text::Open => "열기",
        Text::Images => "이미지",
        Text::NoImages => "이 폴더에 이미지가 없습니다",
        Text::TargetSize => "목표 크기:",
        Text::Swap => "가로 세로 바꾸기",
        Text::ResizeToTarget => "목표 크기로 리사이즈",
        Text::Description => "설명",
        Text::Save => "저장",
        Text::Saving => "저장 중…",
        Text::SavedTo => "저장됨:",
        Text::DescriptionAttached => "설명 저장됨",
        Text::NoDescription => "설명 없음",
        Text::NoSelection => "먼저 이미지와 자를 영역을 선택하세요.",
        Text::InvalidTarget => "가로와 세로는 양의 정수여야 합니다.",
        Text::PickImage => "목록에서 이미지를 선택하세요.",
        Text::Language => "언어",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_language_code() {
        assert_eq!(serde_json::to_string(&Language::Korean).unwrap(), "\"ko\"");
        let parsed: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Language::English);
    }

    #[test]
    fn languages_differ() {
        assert_ne!(
            Language::English.text(Text::Save),
            Language::Korean.text(Text::Save)
        );
    }
}
