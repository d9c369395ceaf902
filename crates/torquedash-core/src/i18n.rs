//! Label selection
//!
//! The cluster ships English and Turkish labels. Selection only, no formatting rules.

use serde::{Deserialize, Serialize};

/// Supported display languages
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    /// English
    #[default]
    English,
    /// Turkish
    Turkish,
}

impl Language {
    /// Locale code
    pub fn locale_code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Turkish => "tr",
        }
    }

    /// Display name of the language in its own language
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Turkish => "Türkçe",
        }
    }

    /// All available languages
    pub fn all() -> &'static [Language] {
        &[Language::English, Language::Turkish]
    }

    /// Labels for this language
    pub fn labels(&self) -> &'static Labels {
        match self {
            Language::English => &ENGLISH,
            Language::Turkish => &TURKISH,
        }
    }
}

/// Static label set shown by the presentation layer
#[derive(Debug, PartialEq, Eq)]
pub struct Labels {
    /// Main window title
    pub window_title: &'static str,
    /// RPM gauge caption
    pub rpm_gauge: &'static str,
    /// Torque gauge caption
    pub torque_gauge: &'static str,
    /// DTC check button
    pub check_dtc: &'static str,
    /// DTC input prompt
    pub dtc_prompt: &'static str,
    /// Title of a successful DTC lookup
    pub dtc_found: &'static str,
    /// Title of a failed DTC lookup
    pub dtc_not_found: &'static str,
    /// Title of error notices
    pub error: &'static str,
    /// Profile caption
    pub profile: &'static str,
    /// Title of the log rotation notice
    pub log_rotated: &'static str,
}

static ENGLISH: Labels = Labels {
    window_title: "Vehicle Instrument Cluster",
    rpm_gauge: "RPM",
    torque_gauge: "Torque",
    check_dtc: "Check Fault Code",
    dtc_prompt: "Enter fault code:",
    dtc_found: "Fault Code Found",
    dtc_not_found: "Fault Code Not Found",
    error: "Error",
    profile: "Profile",
    log_rotated: "Log Rotated",
};

static TURKISH: Labels = Labels {
    window_title: "Araç Gösterge Paneli",
    rpm_gauge: "Devir",
    torque_gauge: "Tork",
    check_dtc: "Arıza Kodunu Kontrol Et",
    dtc_prompt: "Arıza Kodunu Girin:",
    dtc_found: "Arıza Kodu Bulundu",
    dtc_not_found: "Arıza Kodu Bulunamadı",
    error: "Hata",
    profile: "Profil",
    log_rotated: "Kayıt Dosyası Yenilendi",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_selection() {
        assert_eq!(Language::default(), Language::English);
        assert_eq!(Language::Turkish.labels().error, "Hata");
        assert_eq!(Language::English.labels().dtc_not_found, "Fault Code Not Found");
        assert_eq!(Language::all().len(), 2);
    }
}
