//! 추출 패스 -- 스캔 파일 전체를 디스패치하고 디스크립터를 패턴 저장소에 기록
//!
//! 체크섬이 있는 파일 아티팩트를 경로 길이 오름차순(동률이면 소문자 경로 순)으로
//! 처리합니다. 얕은 위치의 컴포넌트가 중첩된 중복보다 먼저 디스크립터를 차지합니다.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use compscan_core::context::ScanContext;
use compscan_core::metrics as m;

use crate::contributor::{ContributorRegistry, dispatch};
use crate::pattern::PatternCache;
use crate::store::PatternStore;

/// 추출 패스 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    /// 디스패치된 파일 수
    pub files_visited: usize,
    /// 하나 이상의 컨트리뷰터가 실패한 파일 수
    pub files_failed: usize,
    /// 저장소에 새로 추가된 디스크립터 수
    pub descriptors_accepted: usize,
    /// qualifier 중복으로 버려진 디스크립터 수
    pub descriptors_duplicate: usize,
    /// 버전 미확정으로 건너뛴 디스크립터 수
    pub descriptors_unspecific: usize,
}

/// 추출 패스를 실행합니다.
///
/// 패턴 캐시는 이 호출 안에서만 사용됩니다.
pub fn extract(
    registry: &ContributorRegistry,
    context: &ScanContext,
    store: &mut PatternStore,
) -> ExtractionSummary {
    let started = Instant::now();
    let mut cache = PatternCache::new();
    let mut summary = ExtractionSummary::default();

    let mut candidates: Vec<(String, &str)> = context
        .files()
        .filter_map(|artifact| {
            let checksum = artifact.checksum.as_deref()?;
            let path = artifact.normalized_path()?;
            Some((path, checksum))
        })
        .collect();
    candidates.sort_by_cached_key(|(path, _)| (path.len(), path.to_lowercase()));

    for (path, checksum) in &candidates {
        summary.files_visited += 1;
        let outcome = dispatch(
            registry,
            &mut cache,
            context.base_dir(),
            path,
            checksum,
            context,
        );
        if outcome.has_failures() {
            summary.files_failed += 1;
        }

        for descriptor in outcome.descriptors {
            if descriptor.is_unspecific() {
                debug!(
                    component = %descriptor.component_name,
                    path = %path,
                    "descriptor version unspecific, skipping"
                );
                summary.descriptors_unspecific += 1;
                continue;
            }

            if store.insert(descriptor) {
                summary.descriptors_accepted += 1;
            } else {
                summary.descriptors_duplicate += 1;
            }
        }
    }

    metrics::counter!(m::EXTRACTION_FILES_DISPATCHED_TOTAL).increment(summary.files_visited as u64);
    metrics::counter!(m::EXTRACTION_DESCRIPTORS_ACCEPTED_TOTAL)
        .increment(summary.descriptors_accepted as u64);
    metrics::histogram!(m::EXTRACTION_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

    info!(
        files = summary.files_visited,
        failed = summary.files_failed,
        accepted = summary.descriptors_accepted,
        duplicate = summary.descriptors_duplicate,
        unspecific = summary.descriptors_unspecific,
        patterns_cached = cache.len(),
        "component pattern extraction complete"
    );

    summary
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use compscan_core::types::{Artifact, ArtifactKind, ScannedFile};

    use super::*;
    use crate::contributor::{ComponentPatternContributor, ContributorError};
    use crate::descriptor::{ComponentPatternDescriptor, UNSPECIFIC_VERSION};

    /// 모든 `package.json`에 대해 디렉토리 이름으로 디스크립터를 만드는 컨트리뷰터
    struct DirNamed {
        version: &'static str,
        seen: Mutex<Vec<String>>,
    }

    impl DirNamed {
        fn new(version: &'static str) -> Self {
            Self {
                version,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ComponentPatternContributor for DirNamed {
        fn id(&self) -> &str {
            "dir-named"
        }
        fn suffixes(&self) -> Vec<String> {
            vec!["**/package.json".to_owned()]
        }
        fn contribute(
            &self,
            _base_dir: &str,
            relative_path: &str,
            _checksum: &str,
            _context: &ScanContext,
        ) -> Result<Vec<ComponentPatternDescriptor>, ContributorError> {
            self.seen.lock().unwrap().push(relative_path.to_owned());
            if relative_path.contains("broken") {
                return Err(ContributorError::Other("cannot parse".to_owned()));
            }
            let mut segments = relative_path.rsplit('/');
            let file = segments.next().unwrap_or_default();
            let dir = segments.next().unwrap_or_default();
            Ok(vec![
                ComponentPatternDescriptor::new(dir, self.version)
                    .with_anchor(format!("{dir}/{file}"), "*"),
            ])
        }
    }

    fn context(paths: &[&str]) -> ScanContext {
        let files: Vec<ScannedFile> = paths.iter().map(|p| ScannedFile::new(*p, "H")).collect();
        ScanContext::from_scanned_files("/scan", &files)
    }

    fn registry(contributor: Arc<DirNamed>) -> ContributorRegistry {
        let mut registry = ContributorRegistry::new();
        registry.register(contributor);
        registry
    }

    #[test]
    fn files_visited_shortest_path_first() {
        let contributor = Arc::new(DirNamed::new("1.0"));
        let registry = registry(contributor.clone());
        let context = context(&[
            "app/node_modules/foo/node_modules/bar/package.json",
            "B/package.json",
            "a/package.json",
            "app/node_modules/foo/package.json",
        ]);

        let mut store = PatternStore::new();
        extract(&registry, &context, &mut store);

        let seen = contributor.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                "a/package.json",
                "B/package.json",
                "app/node_modules/foo/package.json",
                "app/node_modules/foo/node_modules/bar/package.json",
            ]
        );
    }

    #[test]
    fn duplicate_qualifiers_are_counted_once() {
        let registry = registry(Arc::new(DirNamed::new("1.0")));
        let context = context(&["x/foo/package.json", "y/foo/package.json", "z/bar/package.json"]);

        let mut store = PatternStore::new();
        let summary = extract(&registry, &context, &mut store);

        assert_eq!(summary.files_visited, 3);
        assert_eq!(summary.descriptors_accepted, 2);
        assert_eq!(summary.descriptors_duplicate, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.descriptors()[0].provenance, "dir-named");
    }

    #[test]
    fn unspecific_versions_are_skipped() {
        let registry = registry(Arc::new(DirNamed::new(UNSPECIFIC_VERSION)));
        let context = context(&["x/foo/package.json"]);

        let mut store = PatternStore::new();
        let summary = extract(&registry, &context, &mut store);

        assert_eq!(summary.descriptors_unspecific, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn failing_file_does_not_stop_later_files() {
        let registry = registry(Arc::new(DirNamed::new("1.0")));
        let context = context(&["broken/package.json", "later/good/package.json"]);

        let mut store = PatternStore::new();
        let summary = extract(&registry, &context, &mut store);

        assert_eq!(summary.files_visited, 2);
        assert_eq!(summary.files_failed, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.descriptors()[0].component_name, "good");
    }

    #[test]
    fn files_without_checksum_and_components_are_ignored() {
        let contributor = Arc::new(DirNamed::new("1.0"));
        let registry = registry(contributor.clone());
        let mut context = context(&["a/package.json"]);
        context.add_artifact(Artifact::from_scanned(&ScannedFile {
            path: "b/package.json".to_owned(),
            checksum: None,
            root_paths: Default::default(),
        }));
        let mut component = Artifact::new("c-1.0", ArtifactKind::Component);
        component.checksum = Some("H".to_owned());
        component.path_in_asset = Some("c/package.json".to_owned());
        context.add_artifact(component);

        let mut store = PatternStore::new();
        let summary = extract(&registry, &context, &mut store);

        assert_eq!(summary.files_visited, 1);
        assert_eq!(contributor.seen.lock().unwrap().len(), 1);
    }
}
