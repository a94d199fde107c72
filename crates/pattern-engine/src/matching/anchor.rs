//! 앵커 매칭 엔진
//!
//! 디스크립터마다 앵커를 컴파일하고, 가장 긴 리터럴 조각으로 후보 파일을 거른 뒤
//! 경로와 체크섬이 모두 맞는 파일마다 [`MatchResult`]를 하나씩 만듭니다.

use std::collections::BTreeSet;

use tracing::{debug, error};

use compscan_core::context::ScanContext;
use compscan_core::metrics as m;
use compscan_core::types::{WILDCARD_CHECKSUM, normalize_path};

use super::{MatchResult, anchor_segment_count, ownership_roots};
use crate::descriptor::{ComponentPatternDescriptor, DescriptorMode};
use crate::error::PatternEngineError;
use crate::pattern::{AnchorPattern, GlobList};

/// 매칭 후보 파일
struct Candidate<'c> {
    path: String,
    lower: String,
    checksum: Option<&'c str>,
    root_paths: &'c BTreeSet<String>,
}

/// 디스크립터의 앵커와 include/exclude 글롭을 검증하고 `(앵커, 체크섬)`을 반환합니다.
///
/// 위반은 디스크립터 집합 전체의 설정 오류이므로 `error!`로 기록한 뒤 반환합니다.
pub fn validate_descriptor(
    descriptor: &ComponentPatternDescriptor,
) -> Result<(&str, &str), PatternEngineError> {
    let result = check_anchor(descriptor).and_then(|checked| {
        GlobList::parse(&descriptor.include_pattern)?;
        GlobList::parse(&descriptor.exclude_pattern)?;
        Ok(checked)
    });
    if let Err(e) = &result {
        error!(
            component = %descriptor.component_name,
            provenance = %descriptor.provenance,
            error = %e,
            "invalid component pattern descriptor"
        );
    }
    result
}

fn check_anchor(
    descriptor: &ComponentPatternDescriptor,
) -> Result<(&str, &str), PatternEngineError> {
    let Some(anchor) = descriptor.anchor() else {
        return Err(PatternEngineError::MissingVersionAnchor {
            component: descriptor.component_name.clone(),
            provenance: descriptor.provenance.clone(),
        });
    };
    let Some(checksum) = descriptor.anchor_checksum() else {
        return Err(PatternEngineError::MissingAnchorChecksum {
            component: descriptor.component_name.clone(),
            anchor: anchor.to_owned(),
        });
    };
    if anchor.contains("**") {
        return Err(PatternEngineError::RecursiveWildcardInAnchor {
            component: descriptor.component_name.clone(),
            anchor: anchor.to_owned(),
        });
    }
    if descriptor.is_root_anchor() && checksum != WILDCARD_CHECKSUM {
        return Err(PatternEngineError::RootAnchorRequiresWildcardChecksum {
            component: descriptor.component_name.clone(),
            checksum: checksum.to_owned(),
        });
    }
    Ok((anchor, checksum))
}

/// 주어진 모드의 디스크립터를 스캔 파일 집합에 대해 매칭합니다.
///
/// 파일 아티팩트만 후보가 됩니다. 디스크립터 설정 오류가 하나라도 있으면
/// 즉시 에러를 반환하고 이미 계산한 결과는 버립니다.
pub fn match_all<'a>(
    descriptors: impl IntoIterator<Item = &'a ComponentPatternDescriptor>,
    context: &ScanContext,
    deferred: bool,
) -> Result<Vec<MatchResult<'a>>, PatternEngineError> {
    let mode = DescriptorMode::from_deferred(deferred);
    let candidates: Vec<Candidate<'_>> = context
        .files()
        .filter_map(|artifact| {
            let path = artifact.normalized_path()?;
            Some(Candidate {
                lower: path.to_lowercase(),
                path,
                checksum: artifact.checksum.as_deref(),
                root_paths: &artifact.root_paths,
            })
        })
        .collect();

    let mut results = Vec::new();
    for descriptor in descriptors.into_iter().filter(|d| d.mode == mode) {
        let (anchor, expected) = validate_descriptor(descriptor)?;

        if descriptor.is_root_anchor() {
            results.push(MatchResult {
                descriptor,
                anchor_path: None,
                anchor_checksum: WILDCARD_CHECKSUM.to_owned(),
                scan_root: context.base_dir().to_owned(),
                anchor_root: String::new(),
                base_dir: String::new(),
                asset_id_chain: context.asset_id_chain().to_vec(),
                root_paths: BTreeSet::new(),
            });
            continue;
        }

        let anchor = normalize_path(anchor);
        let pattern = AnchorPattern::compile(&anchor)?;
        let segments = anchor_segment_count(&anchor);

        for candidate in &candidates {
            if !pattern.is_match(&candidate.lower) {
                continue;
            }
            let Some(matched_checksum) = accept_checksum(expected, candidate.checksum) else {
                debug!(
                    component = %descriptor.component_name,
                    path = %candidate.path,
                    expected,
                    "anchor checksum mismatch, skipping"
                );
                continue;
            };

            let (anchor_root, base_dir) = ownership_roots(&candidate.path, segments);
            results.push(MatchResult {
                descriptor,
                anchor_path: Some(candidate.path.clone()),
                anchor_checksum: matched_checksum.to_owned(),
                scan_root: context.base_dir().to_owned(),
                anchor_root,
                base_dir,
                asset_id_chain: context.asset_id_chain().to_vec(),
                root_paths: candidate.root_paths.clone(),
            });
        }
    }

    metrics::counter!(m::MATCHING_MATCHES_TOTAL, m::LABEL_MODE => mode.to_string())
        .increment(results.len() as u64);
    debug!(mode = %mode, matches = results.len(), "anchor matching complete");

    Ok(results)
}

/// 앵커 체크섬 검사. 통과하면 결과에 기록할 체크섬을 반환합니다.
///
/// 와일드카드는 어떤 파일이든 허용하고 파일 체크섬(없으면 `*`)을 돌려줍니다.
/// 특정 체크섬은 ASCII 대소문자 무시 비교이며 체크섬 없는 파일은 거부합니다.
fn accept_checksum<'e>(expected: &'e str, actual: Option<&'e str>) -> Option<&'e str> {
    if expected == WILDCARD_CHECKSUM {
        return Some(actual.unwrap_or(WILDCARD_CHECKSUM));
    }
    actual
        .filter(|checksum| checksum.eq_ignore_ascii_case(expected))
        .map(|_| expected)
}
