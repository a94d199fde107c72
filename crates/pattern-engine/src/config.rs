//! 패턴 엔진 설정
//!
//! [`PatternEngineConfig`]는 core의 [`MatcherConfig`](compscan_core::config::MatcherConfig)에서
//! 파생되며 엔진 실행 옵션(지연 패스, 확장 인벤토리, 흡수 파일 제거)을 담습니다.
//!
//! # 사용 예시
//!
//! ```
//! use compscan_pattern_engine::PatternEngineConfig;
//!
//! // 기본값으로 생성
//! let config = PatternEngineConfig::default();
//! config.validate().unwrap();
//!
//! // 빌더로 생성
//! use compscan_pattern_engine::PatternEngineConfigBuilder;
//!
//! let config = PatternEngineConfigBuilder::new()
//!     .run_deferred_pass(false)
//!     .max_scanned_files(10_000)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};

use crate::error::PatternEngineError;

/// 설정 상한값 상수
const MAX_SCANNED_FILES_LIMIT: usize = 50_000_000;
const MAX_PATH_LEN: usize = 4096;

/// 패턴 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternEngineConfig {
    /// 엔진 활성화 여부
    pub enabled: bool,
    /// 즉시 패스 이후 지연 패스 실행 여부
    pub run_deferred_pass: bool,
    /// 확장 인벤토리 공급자 호출 여부
    pub expand_inventories: bool,
    /// 매칭/적용 종료 시 흡수된 아티팩트 제거 여부
    pub purge_absorbed: bool,
    /// 선언형 컨트리뷰터 규칙 디렉토리
    pub rules_dir: String,
    /// 스캔 파일 집합 최대 크기
    pub max_scanned_files: usize,
}

impl Default for PatternEngineConfig {
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

impl PatternEngineConfig {
    /// core의 `MatcherConfig`에서 엔진 설정을 생성합니다.
    pub fn from_core(core: &compscan_core::config::MatcherConfig) -> Self {
        Self {
            enabled: core.enabled,
            run_deferred_pass: core.run_deferred_pass,
            expand_inventories: core.expand_inventories,
            purge_absorbed: core.purge_absorbed,
            rules_dir: core.rules_dir.clone(),
            max_scanned_files: core.max_scanned_files,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `max_scanned_files`: 1-50000000
    /// - `rules_dir`: `..` 컴포넌트 금지, 최대 4096자
    pub fn validate(&self) -> Result<(), PatternEngineError> {
        if self.max_scanned_files == 0 || self.max_scanned_files > MAX_SCANNED_FILES_LIMIT {
            return Err(PatternEngineError::Config {
                field: "max_scanned_files".to_owned(),
                reason: format!("must be 1-{MAX_SCANNED_FILES_LIMIT}"),
            });
        }

        // Path traversal 체크: Path::components()로 ParentDir 컴포넌트 검출
        if std::path::Path::new(&self.rules_dir)
            .components()
            .any(|c| c == std::path::Component::ParentDir)
        {
            return Err(PatternEngineError::Config {
                field: "rules_dir".to_owned(),
                reason: format!(
                    "rules directory '{}' contains path traversal pattern '..'",
                    self.rules_dir
                ),
            });
        }

        if self.rules_dir.len() > MAX_PATH_LEN {
            return Err(PatternEngineError::Config {
                field: "rules_dir".to_owned(),
                reason: format!("rules_dir exceeds maximum length {MAX_PATH_LEN}"),
            });
        }

        Ok(())
    }
}

/// [`PatternEngineConfig`] 빌더
///
/// 빌드 시 유효성 검증을 수행합니다.
#[derive(Default)]
pub struct PatternEngineConfigBuilder {
    config: PatternEngineConfig,
}

impl PatternEngineConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 활성화 여부를 설정합니다.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// 지연 패스 실행 여부를 설정합니다.
    pub fn run_deferred_pass(mut self, run: bool) -> Self {
        self.config.run_deferred_pass = run;
        self
    }

    /// 확장 인벤토리 사용 여부를 설정합니다.
    pub fn expand_inventories(mut self, expand: bool) -> Self {
        self.config.expand_inventories = expand;
        self
    }

    /// 흡수된 아티팩트 제거 여부를 설정합니다.
    pub fn purge_absorbed(mut self, purge: bool) -> Self {
        self.config.purge_absorbed = purge;
        self
    }

    /// 규칙 디렉토리를 설정합니다.
    pub fn rules_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.rules_dir = dir.into();
        self
    }

    /// 최대 스캔 파일 수를 설정합니다.
    pub fn max_scanned_files(mut self, max: usize) -> Self {
        self.config.max_scanned_files = max;
        self
    }

    /// 설정을 빌드합니다. 유효성 검증에 실패하면 에러를 반환합니다.
    pub fn build(self) -> Result<PatternEngineConfig, PatternEngineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
