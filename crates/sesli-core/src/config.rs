use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SesliError};

/// Top-level configuration for the Sesli application.
///
/// Loaded from `~/.sesli/config.toml` by default. Every section falls back to
/// its defaults when absent, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SesliConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub dialogue: DialogueConfig,
}

impl SesliConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SesliConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SesliError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Speech input/output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// BCP-47 language tag handed to both engines.
    pub language: String,
    /// Capture session timeout, measured from session start.
    pub capture_timeout_ms: u64,
    /// Pause between the end of an utterance and the start of listening.
    pub resume_delay_ms: u64,
    /// Pacing of the console synthesizer.
    pub words_per_minute: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "tr-TR".to_string(),
            capture_timeout_ms: 5000,
            resume_delay_ms: 0,
            words_per_minute: 170,
        }
    }
}

/// Search index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of results returned per query.
    pub max_results: usize,
    /// Optional JSON catalog. The built-in catalog is used when unset.
    pub catalog_path: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            catalog_path: None,
        }
    }
}

/// Dialogue vocabulary and prompt texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Tokens accepted as "yes" in `AwaitingConfirmation`.
    pub affirmative: Vec<String>,
    /// Tokens accepted as "no" in `AwaitingConfirmation`.
    pub negative: Vec<String>,
    /// Tokens accepted as "next result" in `AwaitingNext`.
    pub next: Vec<String>,
    /// Tokens accepted as "clear the search" in `AwaitingNext`.
    pub clear: Vec<String>,
    #[serde(default)]
    pub prompts: PromptConfig,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            affirmative: vec!["evet".to_string()],
            negative: vec!["hayır".to_string(), "yok".to_string()],
            next: vec!["diğer".to_string(), "sonraki".to_string()],
            clear: vec!["temizle".to_string(), "kapat".to_string()],
            prompts: PromptConfig::default(),
        }
    }
}

/// Spoken prompt texts.
///
/// `announcement` is a template: `{n}` is the 1-based position, `{title}` the
/// result title and `{score}` the relevance with two decimals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub greeting: String,
    pub announcement: String,
    pub no_results: String,
    pub no_more_results: String,
    pub not_understood: String,
    pub next_or_clear: String,
    pub no_speech: String,
    /// Spoken when recognition fails or is refused.
    #[serde(alias = "permission_denied")]
    pub recognition_error: String,
    pub device_busy: String,
    pub output_unavailable: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            greeting: "Merhaba, bir arama sorgusu söyleyin.".to_string(),
            announcement:
                "{n}. sonuç: {title}. Alaka düzeyi: {score}. Daha fazla bilgi ister misiniz?"
                    .to_string(),
            no_results: "Sonuç bulunamadı.".to_string(),
            no_more_results: "Başka sonuç kalmadı.".to_string(),
            not_understood: "Lütfen evet veya hayır diyerek cevap verin.".to_string(),
            next_or_clear:
                "Sonraki sonuca geçmek için diğer, aramayı kapatmak için temizle deyin."
                    .to_string(),
            no_speech: "Ses algılanamadı. Lütfen tekrar deneyin.".to_string(),
            recognition_error: "Ses tanıma hatası oluştu. Lütfen tekrar deneyin.".to_string(),
            device_busy: "Mikrofon şu anda kullanımda.".to_string(),
            output_unavailable: "Ses çıkışı kullanılamıyor.".to_string(),
        }
    }
}
