use directories::ProjectDirs;
use ini::Ini;
use log::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOGGING_SECTION: &str = "Logging";
const SSML_SECTION: &str = "Ssml";

/// 配置文件和日志文件共用的项目目录。
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "SpeechXml", "speech-xml")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub enable_file_log: bool,
    pub file_log_level: LevelFilter,
    pub console_log_level: LevelFilter,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enable_file_log: false,
            file_log_level: LevelFilter::Info,
            console_log_level: LevelFilter::Warn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsmlSettings {
    /// 内部形式的默认语言，例如 `en_US`
    pub default_language: String,
}

impl Default for SsmlSettings {
    fn default() -> Self {
        Self {
            default_language: "en_US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSettings {
    pub log_settings: LogSettings,
    pub ssml_settings: SsmlSettings,
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        let Some(proj_dirs) = project_dirs() else {
            log::error!("无法获取项目配置目录路径。");
            return None;
        };
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists()
            && let Err(e) = fs::create_dir_all(config_dir)
        {
            log::error!("无法创建配置目录 {config_dir:?}: {e}");
            return None;
        }
        Some(config_dir.join("speech-xml.ini"))
    }

    /// 从默认位置加载配置，文件不存在时写入并使用默认配置。
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            log::warn!("无法确定配置文件路径。将使用运行时默认配置。");
            return Self::default();
        };
        if !path.exists() {
            log::info!("配置文件 {path:?} 未找到。将创建并使用默认配置。");
            let default_settings = Self::default();
            if let Err(e) = default_settings.save_to(&path) {
                log::error!("无法保存初始默认配置文件到 {path:?}: {e}");
            }
            return default_settings;
        }
        match Ini::load_from_file(&path) {
            Ok(conf) => {
                log::info!("从 {path:?} 加载配置成功。");
                Self::from_ini(&conf)
            }
            Err(e) => {
                log::error!("加载配置文件 {path:?} 失败: {e}。将使用默认配置。");
                Self::default()
            }
        }
    }

    /// 从 INI 内容读取配置，缺失或无法解析的键使用默认值。
    #[must_use]
    pub fn from_ini(conf: &Ini) -> Self {
        let defaults = Self::default();
        let log_section = conf.section(Some(LOGGING_SECTION));
        let read_level = |key: &str, fallback: LevelFilter| {
            log_section
                .and_then(|s| s.get(key))
                .and_then(|s| LevelFilter::from_str(s).ok())
                .unwrap_or(fallback)
        };

        let log_settings = LogSettings {
            enable_file_log: log_section
                .and_then(|s| s.get("EnableFileLog"))
                .and_then(|s| s.parse::<bool>().ok())
                .unwrap_or(defaults.log_settings.enable_file_log),
            file_log_level: read_level("FileLogLevel", defaults.log_settings.file_log_level),
            console_log_level: read_level(
                "ConsoleLogLevel",
                defaults.log_settings.console_log_level,
            ),
        };

        let ssml_settings = SsmlSettings {
            default_language: conf
                .section(Some(SSML_SECTION))
                .and_then(|s| s.get("DefaultLanguage"))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map_or(defaults.ssml_settings.default_language, str::to_string),
        };

        Self {
            log_settings,
            ssml_settings,
        }
    }

    #[must_use]
    pub fn to_ini(&self) -> Ini {
        let mut conf = Ini::new();
        conf.with_section(Some(LOGGING_SECTION))
            .set(
                "EnableFileLog",
                self.log_settings.enable_file_log.to_string(),
            )
            .set("FileLogLevel", self.log_settings.file_log_level.to_string())
            .set(
                "ConsoleLogLevel",
                self.log_settings.console_log_level.to_string(),
            );
        conf.with_section(Some(SSML_SECTION)).set(
            "DefaultLanguage",
            self.ssml_settings.default_language.as_str(),
        );
        conf
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        self.to_ini().write_to_file(path)?;
        log::info!("配置已保存到 {path:?}。");
        Ok(())
    }
}
