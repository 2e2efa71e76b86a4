//! 支持的合成语言
//!
//! 共 17 种语言，每种语言有对外显示名和引擎使用的语言代码

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Polish,
    Turkish,
    Russian,
    Dutch,
    Czech,
    Arabic,
    Chinese,
    Japanese,
    Hungarian,
    Korean,
    Hindi,
}

impl Language {
    pub const ALL: [Language; 17] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Polish,
        Language::Turkish,
        Language::Russian,
        Language::Dutch,
        Language::Czech,
        Language::Arabic,
        Language::Chinese,
        Language::Japanese,
        Language::Hungarian,
        Language::Korean,
        Language::Hindi,
    ];

    /// 显示名
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Italian => "Italian",
            Language::Portuguese => "Portuguese",
            Language::Polish => "Polish",
            Language::Turkish => "Turkish",
            Language::Russian => "Russian",
            Language::Dutch => "Dutch",
            Language::Czech => "Czech",
            Language::Arabic => "Arabic",
            Language::Chinese => "Chinese",
            Language::Japanese => "Japanese",
            Language::Hungarian => "Hungarian",
            Language::Korean => "Korean",
            Language::Hindi => "Hindi",
        }
    }

    /// 引擎语言代码
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Polish => "pl",
            Language::Turkish => "tr",
            Language::Russian => "ru",
            Language::Dutch => "nl",
            Language::Czech => "cs",
            Language::Arabic => "ar",
            Language::Chinese => "zh-cn",
            Language::Japanese => "ja",
            Language::Hungarian => "hu",
            Language::Korean => "ko",
            Language::Hindi => "hi",
        }
    }

    /// 按显示名或语言代码解析（忽略大小写）
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.name().eq_ignore_ascii_case(s) || lang.code().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
