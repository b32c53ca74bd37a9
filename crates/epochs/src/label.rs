use std::str::FromStr;

use foundation::Age;

/// Language of the epoch caption under the slider.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LabelLocale {
    #[default]
    English,
    TraditionalChinese,
}

impl FromStr for LabelLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "en" | "en-US" | "english" => Ok(LabelLocale::English),
            "zh" | "zh-Hant" | "zh-TW" | "zh-HK" => Ok(LabelLocale::TraditionalChinese),
            other => Err(format!("unsupported label locale '{other}'")),
        }
    }
}

/// Human-readable caption for an age.
pub fn format_age(age: Age, locale: LabelLocale) -> String {
    let n = i64::from(age.ma()).unsigned_abs();
    match locale {
        LabelLocale::English => {
            if age.is_present() {
                "present".to_string()
            } else if age.is_future() {
                format!("{n} million years in the future")
            } else {
                format!("{n} million years ago")
            }
        }
        LabelLocale::TraditionalChinese => {
            if age.is_present() {
                "現在 (0 Ma)".to_string()
            } else if age.is_future() {
                format!("{n} 百萬年後")
            } else {
                format!("{n} 百萬年前")
            }
        }
    }
}

/// Caption with the epoch name appended when one is known, e.g.
/// `250 million years ago (Pangaea)`.
pub fn format_epoch(age: Age, name: Option<&str>, locale: LabelLocale) -> String {
    let base = format_age(age, locale);
    match name {
        Some(name) if !name.is_empty() => format!("{base} ({name})"),
        _ => base,
    }
}
