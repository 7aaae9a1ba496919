use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::error::StoreResult;
use crate::keyboard::KeyboardLayout;
use crate::segmenter::SentenceSpacing;
use crate::session::SessionConfig;
use crate::timer::TimeLimit;

/// Unknown values parse to the variant's default instead of failing.
macro_rules! lenient_from_string {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<String> for $ty {
                fn from(s: String) -> Self {
                    <$ty>::from_str(s.trim()).unwrap_or_default()
                }
            }
        )+
    };
}

/// Order in which lessons are offered.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase", from = "String")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TextSelection {
    #[default]
    Random,
    Sequential,
    Difficulty,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase", from = "String")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TextType {
    #[default]
    All,
    Lyrics,
    Quotes,
    Code,
    Prose,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(from = "String")]
#[strum(ascii_case_insensitive)]
pub enum TestTime {
    #[default]
    #[serde(rename = "1min")]
    #[strum(serialize = "1min")]
    OneMinute,
    #[serde(rename = "2min")]
    #[strum(serialize = "2min")]
    TwoMinutes,
    #[serde(rename = "5min")]
    #[strum(serialize = "5min")]
    FiveMinutes,
    #[serde(rename = "unlimited")]
    #[strum(serialize = "unlimited")]
    Unlimited,
}

impl TestTime {
    pub fn time_limit(&self) -> TimeLimit {
        match self {
            TestTime::OneMinute => TimeLimit::seconds(60),
            TestTime::TwoMinutes => TimeLimit::seconds(120),
            TestTime::FiveMinutes => TimeLimit::seconds(300),
            TestTime::Unlimited => TimeLimit::UNLIMITED,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TestTime::OneMinute => "You have 1 minute to complete this test",
            TestTime::TwoMinutes => "You have 2 minutes to complete this test",
            TestTime::FiveMinutes => "You have 5 minutes to complete this test",
            TestTime::Unlimited => "Take as much time as you need",
        }
    }
}

/// How strongly typed characters are colored.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase", from = "String")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ColorMode {
    #[default]
    Normal,
    Enhanced,
    Minimal,
}

/// Which keys restart the current test.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(from = "String")]
#[strum(ascii_case_insensitive)]
pub enum ResetHotkey {
    #[default]
    #[serde(rename = "all")]
    #[strum(serialize = "all")]
    All,
    #[serde(rename = "escape")]
    #[strum(serialize = "escape")]
    Escape,
    #[serde(rename = "ctrl+r")]
    #[strum(serialize = "ctrl+r")]
    CtrlR,
}

impl ResetHotkey {
    pub fn allows_escape(&self) -> bool {
        matches!(self, ResetHotkey::All | ResetHotkey::Escape)
    }

    pub fn allows_ctrl_r(&self) -> bool {
        matches!(self, ResetHotkey::All | ResetHotkey::CtrlR)
    }
}

lenient_from_string!(TextSelection, TextType, TestTime, ColorMode, ResetHotkey);

/// The variant after `current`, wrapping around.
pub fn cycle<T: IntoEnumIterator + PartialEq + Copy>(current: T) -> T {
    let all: Vec<T> = T::iter().collect();
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(idx + 1) % all.len()]
}

/// User preferences persisted between runs.
///
/// Missing keys take their default and unknown keys are ignored, so older or
/// hand-edited files still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub text_selection: TextSelection,
    pub text_type: TextType,
    pub test_time: TestTime,
    pub text_color_highlighting: ColorMode,
    pub test_reset_hotkey: ResetHotkey,
    #[serde(rename = "doubleSpacingBetweenSentences")]
    pub double_spacing: bool,
    pub keyboard_layout: KeyboardLayout,
}

impl Settings {
    pub fn spacing(&self) -> SentenceSpacing {
        if self.double_spacing {
            SentenceSpacing::Double
        } else {
            SentenceSpacing::Single
        }
    }

    /// Snapshot for the engine. The host supplies the viewport-derived
    /// paragraph budget.
    pub fn session_config(&self, paragraph_capacity: usize) -> SessionConfig {
        SessionConfig {
            time_limit: self.test_time.time_limit(),
            layout: self.keyboard_layout,
            paragraph_capacity,
            spacing: self.spacing(),
        }
    }
}

pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> StoreResult<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::settings_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        let Ok(bytes) = fs::read(&self.path) else {
            return Settings::default();
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "discarding unreadable settings");
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
