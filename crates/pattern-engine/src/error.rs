//! 패턴 엔진 에러 타입
//!
//! [`PatternEngineError`]는 패턴 엔진 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<PatternEngineError> for CompscanError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **디스크립터 설정 (치명적)**: `MissingVersionAnchor`, `MissingAnchorChecksum`,
//!   `RecursiveWildcardInAnchor`, `RootAnchorRequiresWildcardChecksum`, `InvalidPattern`
//! - **컨트리뷰터 실행 (복구됨)**: `Contributor`
//! - **확장 인벤토리 (복구됨)**: `Expansion`
//! - **규칙 파일**: `RuleLoad`
//! - **설정**: `Config`

use compscan_core::error::{CompscanError, ConfigError, PatternError};

/// 패턴 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum PatternEngineError {
    /// 버전 앵커가 없는 디스크립터
    #[error("descriptor '{component}' from '{provenance}' has no version anchor")]
    MissingVersionAnchor {
        /// 컴포넌트 이름
        component: String,
        /// 디스크립터를 생성한 컨트리뷰터
        provenance: String,
    },

    /// 앵커 체크섬이 없는 디스크립터
    #[error("descriptor '{component}' has no checksum for anchor '{anchor}'")]
    MissingAnchorChecksum {
        /// 컴포넌트 이름
        component: String,
        /// 버전 앵커
        anchor: String,
    },

    /// 앵커에 `**` 포함
    #[error("descriptor '{component}' uses recursive wildcard in anchor '{anchor}'")]
    RecursiveWildcardInAnchor {
        /// 컴포넌트 이름
        component: String,
        /// 버전 앵커
        anchor: String,
    },

    /// 루트 앵커(`*`, `.`)에 특정 체크섬 지정
    #[error("descriptor '{component}' uses root anchor with checksum '{checksum}', expected '*'")]
    RootAnchorRequiresWildcardChecksum {
        /// 컴포넌트 이름
        component: String,
        /// 지정된 체크섬
        checksum: String,
    },

    /// include/exclude 글롭 컴파일 실패
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// 패턴 문자열
        pattern: String,
        /// 실패 사유
        reason: String,
    },

    /// 컨트리뷰터 실행 실패 (디스패치 밖으로 전파되지 않음)
    #[error("contributor '{contributor}' failed on '{path}': {reason}")]
    Contributor {
        /// 컨트리뷰터 ID
        contributor: String,
        /// 앵커 후보 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 확장 인벤토리 공급 실패
    #[error("expansion inventory for '{component}' failed: {reason}")]
    Expansion {
        /// 컴포넌트 이름
        component: String,
        /// 실패 사유
        reason: String,
    },

    /// 컨트리뷰터 규칙 파일 로딩 실패
    #[error("rule load error: {path}: {reason}")]
    RuleLoad {
        /// 규칙 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl PatternEngineError {
    /// 디스크립터 설정 에러(패스 전체를 중단시키는 에러)인지 여부
    pub fn is_descriptor_config(&self) -> bool {
        matches!(
            self,
            Self::MissingVersionAnchor { .. }
                | Self::MissingAnchorChecksum { .. }
                | Self::RecursiveWildcardInAnchor { .. }
                | Self::RootAnchorRequiresWildcardChecksum { .. }
                | Self::InvalidPattern { .. }
        )
    }
}

impl From<PatternEngineError> for CompscanError {
    fn from(err: PatternEngineError) -> Self {
        match err {
            PatternEngineError::Config { field, reason } => {
                CompscanError::Config(ConfigError::InvalidValue { field, reason })
            }
            PatternEngineError::RuleLoad { .. } => {
                CompscanError::Pattern(PatternError::Rule(err.to_string()))
            }
            PatternEngineError::Contributor { .. } | PatternEngineError::Expansion { .. } => {
                CompscanError::Pattern(PatternError::Engine(err.to_string()))
            }
            other => CompscanError::Pattern(PatternError::Descriptor(other.to_string())),
        }
    }
}
