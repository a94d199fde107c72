//! 커버리지/흡수 엔진
//!
//! 매칭 결과마다 include/exclude 글롭을 두 기준점에서 평가합니다.
//!
//! 1. 절대 경로 (스캔 루트 기준): exclude면 건너뛰고, include면 흡수
//! 2. 상대 경로 (앵커 루트 기준): 컴포넌트 기준 디렉토리 하위 파일에만 적용
//!
//! 흡수된 파일은 삭제 지시자를 받고, 살아남은 매칭마다 컴포넌트 아티팩트가 하나씩 추가됩니다.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use compscan_core::context::ScanContext;
use compscan_core::metrics as m;
use compscan_core::types::{Artifact, ArtifactKind, AssetMarker, WILDCARD_CHECKSUM, fold_case};

use super::MatchResult;
use crate::descriptor::{ComponentPatternDescriptor, InventorySupplier};
use crate::error::PatternEngineError;
use crate::pattern::GlobList;

/// 컴포넌트 아티팩트 속성 키: 디스크립터를 만든 컨트리뷰터
pub const ATTR_PROVENANCE: &str = "provenance";
/// 컴포넌트 아티팩트 속성 키: 컴포넌트 유형
pub const ATTR_COMPONENT_TYPE: &str = "component_type";
/// 컴포넌트 아티팩트 속성 키: 디스크립터의 버전 앵커
pub const ATTR_VERSION_ANCHOR: &str = "version_anchor";

/// 흡수 단계 옵션
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    /// 확장 인벤토리 공급자를 호출할지 여부
    pub expand_inventories: bool,
    /// 끝에서 삭제 지시자가 붙은 아티팩트를 제거할지 여부
    pub purge_absorbed: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            expand_inventories: true,
            purge_absorbed: true,
        }
    }
}

/// 흡수 단계 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    /// 입력된 매칭 결과 수
    pub matches: usize,
    /// 흡수 파일이 없어 버려진 매칭 수
    pub matches_dropped: usize,
    /// 흡수 처리 횟수 (같은 파일이 중첩 컴포넌트에 여러 번 흡수될 수 있음)
    pub artifacts_absorbed: usize,
    /// 추가된 컴포넌트 아티팩트 수
    pub components_added: usize,
    /// 호출된 확장 인벤토리 공급자 수
    pub expansions_applied: usize,
    /// 제거된 아티팩트 수
    pub artifacts_removed: usize,
}

impl ApplySummary {
    /// 다른 요약을 누적합니다.
    pub fn merge(&mut self, other: &ApplySummary) {
        self.matches += other.matches;
        self.matches_dropped += other.matches_dropped;
        self.artifacts_absorbed += other.artifacts_absorbed;
        self.components_added += other.components_added;
        self.expansions_applied += other.expansions_applied;
        self.artifacts_removed += other.artifacts_removed;
    }
}

/// 이미 호출된 확장 공급자 기록
///
/// 공급자 인스턴스(`Arc` 포인터) 단위로 판별합니다.
#[derive(Debug, Default)]
pub struct ExpansionLedger {
    seen: Vec<Arc<dyn InventorySupplier>>,
}

impl ExpansionLedger {
    /// 빈 기록을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 처음 보는 공급자면 기록하고 `true`를 반환합니다.
    pub fn first_time(&mut self, supplier: &Arc<dyn InventorySupplier>) -> bool {
        if self.seen.iter().any(|seen| Arc::ptr_eq(seen, supplier)) {
            return false;
        }
        self.seen.push(Arc::clone(supplier));
        true
    }

    /// 기록된 공급자 수
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// 기록이 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// 기록을 비웁니다.
    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

/// 디스크립터 하나의 컴파일된 include/exclude 목록
struct CoverageRules<'a> {
    descriptor: &'a ComponentPatternDescriptor,
    include: GlobList,
    exclude: GlobList,
}

impl CoverageRules<'_> {
    fn covers(&self, lower_path: &str, anchor_root: &str, base_dir: &str) -> bool {
        if self.exclude.is_match(lower_path) {
            return false;
        }
        if self.include.is_match(lower_path) {
            return true;
        }
        if !within(lower_path, base_dir) {
            return false;
        }
        let relative = relative_to(lower_path, anchor_root);
        !self.exclude.is_match(relative) && self.include.is_match(relative)
    }
}

/// `path`가 `dir` 하위(또는 같은 경로)인지 여부. 빈 `dir`은 스캔 루트입니다.
fn within(path: &str, dir: &str) -> bool {
    dir.is_empty()
        || path
            .strip_prefix(dir)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn relative_to<'p>(path: &'p str, root: &str) -> &'p str {
    if root.is_empty() {
        return path;
    }
    path.strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path)
}

/// 컴포넌트 에셋 ID를 생성합니다.
pub fn component_asset_id(part: &str, checksum: &str) -> String {
    if checksum == WILDCARD_CHECKSUM {
        format!("AID-{part}")
    } else {
        format!("AID-{part}-{checksum}")
    }
}

/// 매칭 결과를 스캔 컨텍스트에 적용합니다.
///
/// 흡수 대상은 호출 시점의 파일 아티팩트뿐이며, 이 호출에서 추가된 컴포넌트와
/// 확장 아티팩트는 흡수되지 않습니다.
///
/// # Errors
///
/// include/exclude 글롭을 컴파일할 수 없으면 [`PatternEngineError::InvalidPattern`]을
/// 반환합니다. 글롭은 모두 먼저 컴파일되므로 이 경우 컨텍스트는 변경되지 않습니다.
pub fn apply_matches(
    matches: &[MatchResult<'_>],
    context: &mut ScanContext,
    options: ApplyOptions,
    ledger: &mut ExpansionLedger,
) -> Result<ApplySummary, PatternEngineError> {
    let mut summary = ApplySummary {
        matches: matches.len(),
        ..ApplySummary::default()
    };

    // 흡수 후보 스냅샷: 인덱스는 추가만 일어나는 동안 안정적
    let snapshot: Vec<Option<String>> = context
        .artifacts()
        .iter()
        .map(|artifact| {
            (artifact.kind == ArtifactKind::File)
                .then(|| artifact.normalized_path())
                .flatten()
                .map(|path| fold_case(&path))
        })
        .collect();

    // 컨텍스트를 건드리기 전에 모든 글롭을 컴파일
    let mut compiled: Vec<CoverageRules<'_>> = Vec::new();
    let mut rules_for_match = Vec::with_capacity(matches.len());
    for result in matches {
        let descriptor = result.descriptor;
        let index = match compiled
            .iter()
            .position(|rules| std::ptr::eq(rules.descriptor, descriptor))
        {
            Some(index) => index,
            None => {
                compiled.push(CoverageRules {
                    descriptor,
                    include: GlobList::parse(&descriptor.include_pattern)?,
                    exclude: GlobList::parse(&descriptor.exclude_pattern)?,
                });
                compiled.len() - 1
            }
        };
        rules_for_match.push(index);
    }

    for (result, &rules_index) in matches.iter().zip(&rules_for_match) {
        let descriptor = result.descriptor;
        let rules = &compiled[rules_index];

        let asset_id = component_asset_id(&descriptor.part, &result.anchor_checksum);
        let mut owners = result.asset_id_chain.clone();
        owners.push(asset_id.clone());

        let anchor_root = fold_case(&result.anchor_root);
        let base_dir = fold_case(&result.base_dir);
        let mut absorbed = 0usize;
        for (artifact, path) in context.artifacts_mut().iter_mut().zip(&snapshot) {
            let Some(path) = path else {
                continue;
            };
            if rules.covers(path, &anchor_root, &base_dir) {
                artifact.absorb(&owners);
                absorbed += 1;
            }
        }
        summary.artifacts_absorbed += absorbed;

        if absorbed == 0 && !descriptor.no_file_match_required {
            debug!(
                component = %descriptor.part,
                anchor = result.anchor_path.as_deref().unwrap_or("*"),
                "match absorbed no files, dropping"
            );
            summary.matches_dropped += 1;
            continue;
        }

        context.add_artifact(component_artifact(result, &asset_id));
        summary.components_added += 1;

        if options.expand_inventories {
            if let Some(supplier) = &descriptor.expansion {
                if ledger.first_time(supplier) {
                    summary.expansions_applied += 1;
                    expand(descriptor, supplier.as_ref(), &owners, context);
                }
            }
        }
    }

    if options.purge_absorbed {
        summary.artifacts_removed = context.remove_deleted();
    }

    metrics::counter!(m::MATCHING_ARTIFACTS_ABSORBED_TOTAL)
        .increment(summary.artifacts_absorbed as u64);
    metrics::counter!(m::MATCHING_MATCHES_DROPPED_TOTAL).increment(summary.matches_dropped as u64);
    metrics::counter!(m::MATCHING_EXPANSIONS_TOTAL).increment(summary.expansions_applied as u64);

    info!(
        matches = summary.matches,
        dropped = summary.matches_dropped,
        absorbed = summary.artifacts_absorbed,
        components = summary.components_added,
        expansions = summary.expansions_applied,
        removed = summary.artifacts_removed,
        "component patterns applied"
    );

    Ok(summary)
}

fn component_artifact(result: &MatchResult<'_>, asset_id: &str) -> Artifact {
    let descriptor = result.descriptor;
    let mut artifact = Artifact::new(descriptor.part.clone(), ArtifactKind::Component);
    artifact.component = Some(descriptor.component_name.clone());
    artifact.version = Some(descriptor.version.clone());
    artifact.checksum = Some(result.anchor_checksum.clone());
    artifact.path_in_asset = result.anchor_path.clone();
    artifact.root_paths = result.root_paths.clone();
    artifact.asset_id = Some(asset_id.to_owned());
    artifact.mark_all(&result.asset_id_chain, AssetMarker::Contains);
    artifact.mark_all(&[asset_id.to_owned()], AssetMarker::Describes);

    artifact
        .attributes
        .insert(ATTR_PROVENANCE.to_owned(), descriptor.provenance.clone());
    if let Some(component_type) = &descriptor.component_type {
        artifact
            .attributes
            .insert(ATTR_COMPONENT_TYPE.to_owned(), component_type.clone());
    }
    if let Some(anchor) = descriptor.anchor() {
        artifact
            .attributes
            .insert(ATTR_VERSION_ANCHOR.to_owned(), anchor.to_owned());
    }
    artifact
}

fn expand(
    descriptor: &ComponentPatternDescriptor,
    supplier: &dyn InventorySupplier,
    owners: &[String],
    context: &mut ScanContext,
) {
    let inventory = match supplier.supply() {
        Ok(inventory) => inventory,
        Err(e) => {
            let error = PatternEngineError::Expansion {
                component: descriptor.part.clone(),
                reason: e.to_string(),
            };
            warn!(
                component = %descriptor.part,
                provenance = %descriptor.provenance,
                error = %error,
                "expansion inventory failed"
            );
            return;
        }
    };

    let manages_asset_ids = inventory.manages_asset_ids;
    let added = inventory.artifacts.len();
    context.extend_artifacts(inventory.artifacts.into_iter().map(|mut artifact| {
        artifact.kind = ArtifactKind::Expanded;
        if !manages_asset_ids {
            artifact.mark_all(owners, AssetMarker::Contains);
        }
        artifact
    }));
    for asset in inventory.assets {
        context.add_asset(asset);
    }

    debug!(
        component = %descriptor.part,
        artifacts = added,
        manages_asset_ids,
        "expansion inventory merged"
    );
}
