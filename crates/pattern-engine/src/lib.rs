#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 타입 (`PatternEngineError`)
//! - [`config`]: 엔진 설정 (`PatternEngineConfig`, 빌더)
//! - [`descriptor`]: 컴포넌트 패턴 디스크립터와 확장 인벤토리 공급자
//! - [`store`]: qualifier 기반 디스크립터 저장소 (`PatternStore`)
//! - [`pattern`]: 접미어 와일드카드 캐시, include/exclude 글롭, 버전 앵커
//! - [`contributor`]: 탐지기 trait, 레지스트리, 디스패치, 선언형 규칙
//! - [`extraction`]: 추출 패스
//! - [`matching`]: 앵커 매칭과 커버리지/흡수
//! - [`engine`]: 진입점 (`ComponentPatternEngine`, `ComponentPatternEngineBuilder`)

pub mod config;
pub mod contributor;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod matching;
pub mod pattern;
pub mod store;

// --- Public API Re-exports ---

// Engine
pub use engine::{ComponentPatternEngine, ComponentPatternEngineBuilder, RunSummary};

// Configuration
pub use config::{PatternEngineConfig, PatternEngineConfigBuilder};

// Error
pub use error::PatternEngineError;

// Descriptor
pub use descriptor::{
    ComponentPatternDescriptor, DescriptorMode, ExpandedInventory, InventorySupplier,
    ROOT_ANCHORS, UNSPECIFIC_VERSION,
};

// Store
pub use store::PatternStore;

// Contributors
pub use contributor::{
    ComponentPatternContributor, ContributorError, ContributorRegistry, ContributorRule,
    DeclarativeContributor, RuleLoader,
};

// Passes
pub use extraction::ExtractionSummary;
pub use matching::{ApplyOptions, ApplySummary, MatchResult};

// Patterns
pub use pattern::PatternCache;
