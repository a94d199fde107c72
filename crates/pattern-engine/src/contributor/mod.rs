//! 컨트리뷰터 -- 형식별 탐지기 인터페이스와 등록/디스패치
//!
//! [`ComponentPatternContributor`] trait은 각 형식의 탐지기가 구현해야 하는 인터페이스입니다.
//! [`ContributorRegistry`]는 탐지기를 `(phase, suffix)` 단위로 보관하고,
//! [`dispatch`]는 파일 하나에 대해 해당하는 탐지기를 모두 실행합니다.
//!
//! # 확장
//!
//! 새로운 형식을 지원하려면 `ComponentPatternContributor` trait을 구현하고
//! 레지스트리에 등록합니다. 코드 없이 규칙만으로 정의하려면
//! [`DeclarativeContributor`]와 [`RuleLoader`]를 사용합니다.

pub mod declarative;
pub mod dispatch;
pub mod loader;
pub mod registry;

use compscan_core::context::ScanContext;

use crate::descriptor::ComponentPatternDescriptor;

pub use declarative::{ContributorRule, DeclarativeContributor};
pub use dispatch::{DispatchOutcome, dispatch};
pub use loader::RuleLoader;
pub use registry::{ContributorRegistry, SuffixGroup};

/// 기본 phase
pub const DEFAULT_PHASE: u32 = 100;

/// 컨트리뷰터 실행 에러
///
/// 디스패치에서 경고 로그로 변환되며 스캔을 중단시키지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum ContributorError {
    /// 앵커 파일 내용을 해석할 수 없음
    #[error("malformed anchor file '{path}': {reason}")]
    Malformed {
        /// 앵커 파일 경로
        path: String,
        /// 사유
        reason: String,
    },

    /// 앵커 파일을 읽을 수 없음
    #[error("cannot read '{path}': {source}")]
    Io {
        /// 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 기타 실패
    #[error("{0}")]
    Other(String),
}

/// 컴포넌트 패턴 컨트리뷰터 trait
///
/// 앵커 파일(매니페스트, 패키지 DB 레코드 등)을 보고 컴포넌트 디스크립터를 생성합니다.
pub trait ComponentPatternContributor: Send + Sync {
    /// 컨트리뷰터 식별자 (디스크립터 provenance로 기록됨)
    fn id(&self) -> &str;

    /// 실행 순서. 낮은 값이 먼저 실행됩니다.
    fn phase(&self) -> u32 {
        DEFAULT_PHASE
    }

    /// 앵커 후보를 고르는 소문자 접미어 와일드카드 목록
    fn suffixes(&self) -> Vec<String>;

    /// 접미어 매칭 전에 호출되는 저비용 사전 검사
    ///
    /// 경로는 소문자로 전달됩니다.
    fn applies(&self, _lower_path: &str) -> bool {
        true
    }

    /// 앵커 파일 하나에서 디스크립터를 생성합니다.
    ///
    /// # Arguments
    ///
    /// - `base_dir`: 스캔 루트
    /// - `relative_path`: 스캔 루트 기준 앵커 파일 경로 (원래 대소문자 유지)
    /// - `checksum`: 앵커 파일 체크섬
    /// - `context`: 현재 스캔 컨텍스트 (읽기 전용)
    fn contribute(
        &self,
        base_dir: &str,
        relative_path: &str,
        checksum: &str,
        context: &ScanContext,
    ) -> Result<Vec<ComponentPatternDescriptor>, ContributorError>;
}
