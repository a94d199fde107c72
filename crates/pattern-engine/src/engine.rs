//! 컴포넌트 패턴 엔진 -- 추출, 매칭, 흡수 흐름 관리
//!
//! [`ComponentPatternEngine`]은 컨트리뷰터 레지스트리와 설정을 소유하고
//! 외부에 두 가지 연산을 제공합니다.
//!
//! ```text
//! ScanContext --> extract_component_patterns --> PatternStore
//!                                                    |
//!                          match_and_apply_component_patterns(deferred)
//!                                                    |
//!                        match_all --> apply_matches --> ScanContext (변경됨)
//! ```
//!
//! [`run_all`](ComponentPatternEngine::run_all)은 추출, 즉시 패스, 지연 패스를 차례로 실행합니다.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use compscan_core::context::ScanContext;
use compscan_core::metrics as m;

use crate::config::PatternEngineConfig;
use crate::contributor::{
    ComponentPatternContributor, ContributorRegistry, ContributorRule, DeclarativeContributor,
};
use crate::descriptor::DescriptorMode;
use crate::error::PatternEngineError;
use crate::extraction::{ExtractionSummary, extract};
use crate::matching::{ApplyOptions, ApplySummary, ExpansionLedger, apply_matches, match_all};
use crate::store::PatternStore;

/// 전체 실행 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// 추출 패스 요약
    pub extraction: ExtractionSummary,
    /// 즉시 패스 요약
    pub immediate: ApplySummary,
    /// 지연 패스 요약 (실행하지 않았으면 None)
    pub deferred: Option<ApplySummary>,
}

impl RunSummary {
    /// 두 패스를 합친 적용 요약
    pub fn total(&self) -> ApplySummary {
        let mut total = self.immediate;
        if let Some(deferred) = &self.deferred {
            total.merge(deferred);
        }
        total
    }
}

/// 컴포넌트 패턴 엔진
///
/// 확장 인벤토리 공급자 기록은 엔진 인스턴스에 보관되며
/// [`run_all`](Self::run_all) 시작 시 또는 [`reset_expansions`](Self::reset_expansions)로 초기화됩니다.
pub struct ComponentPatternEngine {
    config: PatternEngineConfig,
    registry: ContributorRegistry,
    ledger: ExpansionLedger,
}

impl ComponentPatternEngine {
    /// 엔진 설정
    pub fn config(&self) -> &PatternEngineConfig {
        &self.config
    }

    /// 컨트리뷰터 레지스트리
    pub fn registry(&self) -> &ContributorRegistry {
        &self.registry
    }

    /// 확장 인벤토리 공급자 기록을 초기화합니다.
    pub fn reset_expansions(&mut self) {
        self.ledger.clear();
    }

    /// 스캔 파일 전체에서 디스크립터를 추출하여 저장소에 기록합니다.
    pub fn extract_component_patterns(
        &self,
        context: &ScanContext,
        store: &mut PatternStore,
    ) -> ExtractionSummary {
        extract(&self.registry, context, store)
    }

    /// 저장소의 디스크립터 중 주어진 모드의 것을 매칭하고 컨텍스트에 적용합니다.
    ///
    /// # Errors
    ///
    /// 디스크립터 설정 에러(잘못된 include/exclude 글롭 포함)가 하나라도 있으면
    /// 컨텍스트를 변경하지 않고 즉시 반환합니다.
    pub fn match_and_apply_component_patterns(
        &mut self,
        store: &PatternStore,
        context: &mut ScanContext,
        deferred: bool,
    ) -> Result<ApplySummary, PatternEngineError> {
        let started = Instant::now();
        let mode = DescriptorMode::from_deferred(deferred);

        let matches = match_all(store.iter_mode(mode), context, deferred)?;
        let options = ApplyOptions {
            expand_inventories: self.config.expand_inventories,
            purge_absorbed: self.config.purge_absorbed,
        };
        let summary = apply_matches(&matches, context, options, &mut self.ledger)?;

        metrics::histogram!(m::MATCHING_DURATION_SECONDS, m::LABEL_MODE => mode.to_string())
            .record(started.elapsed().as_secs_f64());

        Ok(summary)
    }

    /// 추출, 즉시 패스, (설정 시) 지연 패스를 차례로 실행합니다.
    ///
    /// 엔진이 비활성화되어 있으면 아무것도 하지 않고 빈 요약을 반환합니다.
    ///
    /// # Errors
    ///
    /// - 파일 아티팩트 수가 `max_scanned_files`를 초과하는 경우
    /// - 매칭 패스에서 디스크립터 설정 에러가 발생한 경우
    pub fn run_all(
        &mut self,
        context: &mut ScanContext,
        store: &mut PatternStore,
    ) -> Result<RunSummary, PatternEngineError> {
        if !self.config.enabled {
            info!("component pattern engine disabled, skipping");
            return Ok(RunSummary::default());
        }

        let files = context.files().count();
        if files > self.config.max_scanned_files {
            return Err(PatternEngineError::Config {
                field: "max_scanned_files".to_owned(),
                reason: format!(
                    "scan has {files} files, limit is {}",
                    self.config.max_scanned_files
                ),
            });
        }

        self.reset_expansions();

        let extraction = self.extract_component_patterns(context, store);
        let immediate = self.match_and_apply_component_patterns(store, context, false)?;
        let deferred = if self.config.run_deferred_pass {
            Some(self.match_and_apply_component_patterns(store, context, true)?)
        } else {
            None
        };

        let summary = RunSummary {
            extraction,
            immediate,
            deferred,
        };
        let total = summary.total();
        info!(
            descriptors = store.len(),
            components = total.components_added,
            absorbed = total.artifacts_absorbed,
            remaining = context.artifacts().len(),
            "component pattern run complete"
        );

        Ok(summary)
    }
}

impl std::fmt::Debug for ComponentPatternEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentPatternEngine")
            .field("config", &self.config)
            .field("contributors", &self.registry.len())
            .field("expansions", &self.ledger.len())
            .finish()
    }
}

/// 컴포넌트 패턴 엔진 빌더
///
/// 컨트리뷰터를 등록하고 빌드 시 설정을 검증합니다.
pub struct ComponentPatternEngineBuilder {
    config: PatternEngineConfig,
    contributors: Vec<Arc<dyn ComponentPatternContributor>>,
    rules: Vec<ContributorRule>,
}

impl ComponentPatternEngineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: PatternEngineConfig::default(),
            contributors: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// 엔진 설정을 지정합니다.
    pub fn config(mut self, config: PatternEngineConfig) -> Self {
        self.config = config;
        self
    }

    /// 컨트리뷰터를 추가합니다. 등록 순서가 같은 phase 내 실행 순서입니다.
    pub fn contributor(mut self, contributor: Arc<dyn ComponentPatternContributor>) -> Self {
        self.contributors.push(contributor);
        self
    }

    /// 여러 컨트리뷰터를 추가합니다.
    pub fn contributors(
        mut self,
        contributors: impl IntoIterator<Item = Arc<dyn ComponentPatternContributor>>,
    ) -> Self {
        self.contributors.extend(contributors);
        self
    }

    /// 선언형 규칙을 추가합니다. 코드 컨트리뷰터 뒤에 등록됩니다.
    pub fn rules(mut self, rules: impl IntoIterator<Item = ContributorRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// 엔진을 빌드합니다.
    ///
    /// # Errors
    ///
    /// - 설정 검증 실패
    /// - 유효하지 않은 선언형 규칙
    pub fn build(self) -> Result<ComponentPatternEngine, PatternEngineError> {
        self.config.validate()?;

        let mut registry = ContributorRegistry::new();
        for contributor in self.contributors {
            registry.register(contributor);
        }
        for rule in self.rules {
            registry.register(Arc::new(DeclarativeContributor::new(rule)?));
        }

        info!(
            contributors = registry.len(),
            deferred_pass = self.config.run_deferred_pass,
            "component pattern engine built"
        );

        Ok(ComponentPatternEngine {
            config: self.config,
            registry,
            ledger: ExpansionLedger::new(),
        })
    }
}

impl Default for ComponentPatternEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
