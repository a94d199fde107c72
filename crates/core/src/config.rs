//! 설정 관리 -- compscan.toml 파싱 및 런타임 설정
//!
//! [`CompscanConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`COMPSCAN_MATCHER_RULES_DIR=/opt/rules` 형식)
//! 3. 설정 파일 (`compscan.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), compscan_core::error::CompscanError> {
//! use compscan_core::config::CompscanConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = CompscanConfig::load("compscan.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = CompscanConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CompscanError, ConfigError};

/// compscan 통합 설정
///
/// `compscan.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompscanConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 컴포넌트 패턴 매처 설정
    #[serde(default)]
    pub matcher: MatcherConfig,
}

impl CompscanConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CompscanError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, CompscanError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CompscanError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CompscanError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, CompscanError> {
        toml::from_str(toml_str).map_err(|e| {
            CompscanError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `COMPSCAN_{SECTION}_{FIELD}`
    /// 예: `COMPSCAN_MATCHER_RUN_DEFERRED_PASS=false`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "COMPSCAN_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "COMPSCAN_GENERAL_LOG_FORMAT");

        // Matcher
        override_bool(&mut self.matcher.enabled, "COMPSCAN_MATCHER_ENABLED");
        override_bool(
            &mut self.matcher.run_deferred_pass,
            "COMPSCAN_MATCHER_RUN_DEFERRED_PASS",
        );
        override_bool(
            &mut self.matcher.expand_inventories,
            "COMPSCAN_MATCHER_EXPAND_INVENTORIES",
        );
        override_bool(
            &mut self.matcher.purge_absorbed,
            "COMPSCAN_MATCHER_PURGE_ABSORBED",
        );
        override_string(&mut self.matcher.rules_dir, "COMPSCAN_MATCHER_RULES_DIR");
        override_usize(
            &mut self.matcher.max_scanned_files,
            "COMPSCAN_MATCHER_MAX_SCANNED_FILES",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CompscanError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.matcher.enabled {
            if self.matcher.max_scanned_files == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "matcher.max_scanned_files".to_owned(),
                    reason: "must be greater than 0 when matcher is enabled".to_owned(),
                }
                .into());
            }

            if self.matcher.rules_dir.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "matcher.rules_dir".to_owned(),
                    reason: "rules_dir must not be empty when matcher is enabled".to_owned(),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 컴포넌트 패턴 매처 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 즉시(immediate) 패스 이후 지연(deferred) 패스 실행 여부
    pub run_deferred_pass: bool,
    /// 디스크립터의 확장 인벤토리 공급자 호출 여부
    pub expand_inventories: bool,
    /// 흡수된 아티팩트를 패스 종료 시 제거할지 여부
    pub purge_absorbed: bool,
    /// 선언형 컨트리뷰터 규칙 디렉토리
    pub rules_dir: String,
    /// 스캔 파일 집합의 최대 크기
    pub max_scanned_files: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            run_deferred_pass: true,
            expand_inventories: true,
            purge_absorbed: true,
            rules_dir: "/etc/compscan/contributors".to_owned(),
            max_scanned_files: 1_000_000,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}
