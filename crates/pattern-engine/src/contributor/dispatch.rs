//! 디스패치 -- 파일 하나에 해당하는 모든 컨트리뷰터 실행
//!
//! 경로는 한 번만 소문자로 변환합니다. 각 접미어 그룹에서 `applies()`가 참인
//! 컨트리뷰터가 하나라도 있을 때만 접미어 매처를 평가합니다.

use std::sync::Arc;

use tracing::{error, trace, warn};

use compscan_core::context::ScanContext;
use compscan_core::metrics as m;

use super::{ComponentPatternContributor, ContributorRegistry};
use crate::descriptor::ComponentPatternDescriptor;
use crate::error::PatternEngineError;
use crate::pattern::PatternCache;

/// 파일 하나의 디스패치 결과
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// 모든 phase/컨트리뷰터가 생성한 디스크립터 (provenance 기록됨)
    pub descriptors: Vec<ComponentPatternDescriptor>,
    /// 실패한 컨트리뷰터 실행 (이미 로그로 기록됨)
    pub failures: Vec<PatternEngineError>,
}

impl DispatchOutcome {
    /// 실패한 컨트리뷰터가 있었는지 여부
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// 앵커 후보 파일 하나를 등록된 컨트리뷰터에 디스패치합니다.
///
/// 컨트리뷰터 실패는 `warn!`으로 기록하고 나머지 컨트리뷰터를 계속 실행합니다.
pub fn dispatch(
    registry: &ContributorRegistry,
    cache: &mut PatternCache,
    base_dir: &str,
    relative_path: &str,
    checksum: &str,
    context: &ScanContext,
) -> DispatchOutcome {
    let lower_path = relative_path.to_lowercase();
    let mut outcome = DispatchOutcome::default();

    for (phase, groups) in registry.all_buckets() {
        for group in groups {
            let interested: Vec<&Arc<dyn ComponentPatternContributor>> = group
                .contributors
                .iter()
                .filter(|c| c.applies(&lower_path))
                .collect();
            if interested.is_empty() {
                continue;
            }

            match cache.is_match(&group.suffix, &lower_path) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    error!(suffix = %group.suffix, error = %e, "suffix pattern does not compile");
                    continue;
                }
            }

            for contributor in interested {
                trace!(contributor = contributor.id(), phase, path = relative_path, "contribute");
                match contributor.contribute(base_dir, relative_path, checksum, context) {
                    Ok(descriptors) => {
                        outcome
                            .descriptors
                            .extend(descriptors.into_iter().map(|mut d| {
                                d.provenance = contributor.id().to_owned();
                                d
                            }));
                    }
                    Err(e) => {
                        warn!(
                            contributor = contributor.id(),
                            path = relative_path,
                            error = %e,
                            "contributor failed, skipping"
                        );
                        metrics::counter!(
                            m::EXTRACTION_CONTRIBUTOR_FAILURES_TOTAL,
                            m::LABEL_CONTRIBUTOR => contributor.id().to_owned()
                        )
                        .increment(1);
                        outcome.failures.push(PatternEngineError::Contributor {
                            contributor: contributor.id().to_owned(),
                            path: relative_path.to_owned(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::super::{ContributorError, DEFAULT_PHASE};
    use super::*;

    /// 호출 기록을 남기는 테스트 컨트리뷰터
    struct Recording {
        id: &'static str,
        phase: u32,
        suffix: &'static str,
        applies: bool,
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl Recording {
        fn new(id: &'static str, suffix: &'static str) -> Self {
            Self {
                id,
                phase: DEFAULT_PHASE,
                suffix,
                applies: true,
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ComponentPatternContributor for Recording {
        fn id(&self) -> &str {
            self.id
        }
        fn phase(&self) -> u32 {
            self.phase
        }
        fn suffixes(&self) -> Vec<String> {
            vec![self.suffix.to_owned()]
        }
        fn applies(&self, _lower_path: &str) -> bool {
            self.applies
        }
        fn contribute(
            &self,
            _base_dir: &str,
            relative_path: &str,
            checksum: &str,
            _context: &ScanContext,
        ) -> Result<Vec<ComponentPatternDescriptor>, ContributorError> {
            self.calls.lock().unwrap().push(relative_path.to_owned());
            if self.fail {
                return Err(ContributorError::Malformed {
                    path: relative_path.to_owned(),
                    reason: "boom".to_owned(),
                });
            }
            Ok(vec![
                ComponentPatternDescriptor::new(self.id, "1.0").with_anchor(relative_path, checksum),
            ])
        }
    }

    fn run(registry: &ContributorRegistry, path: &str) -> DispatchOutcome {
        let mut cache = PatternCache::new();
        let context = ScanContext::new("/scan");
        dispatch(registry, &mut cache, "/scan", path, "H1", &context)
    }

    #[test]
    fn failing_contributor_does_not_stop_sibling() {
        let broken = Arc::new(Recording {
            fail: true,
            ..Recording::new("broken", "**/*.json")
        });
        let healthy = Arc::new(Recording::new("healthy", "**/*.json"));

        let mut registry = ContributorRegistry::new();
        registry.register(broken.clone());
        registry.register(healthy.clone());

        let outcome = run(&registry, "dir/bad.json");
        assert_eq!(broken.calls(), vec!["dir/bad.json"]);
        assert_eq!(healthy.calls(), vec!["dir/bad.json"]);
        assert_eq!(outcome.descriptors.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            outcome.failures[0],
            PatternEngineError::Contributor { .. }
        ));
    }

    #[test]
    fn provenance_is_tagged() {
        let mut registry = ContributorRegistry::new();
        registry.register(Arc::new(Recording::new("npm", "**/package.json")));

        let outcome = run(&registry, "App/Package.JSON");
        assert_eq!(outcome.descriptors.len(), 1);
        assert_eq!(outcome.descriptors[0].provenance, "npm");
        assert!(!outcome.has_failures());
    }

    #[test]
    fn non_applying_contributor_is_not_invoked() {
        let skipped = Arc::new(Recording {
            applies: false,
            ..Recording::new("skipped", "**/package.json")
        });
        let mut registry = ContributorRegistry::new();
        registry.register(skipped.clone());

        let outcome = run(&registry, "a/package.json");
        assert!(skipped.calls().is_empty());
        assert!(outcome.descriptors.is_empty());
    }

    #[test]
    fn suffix_mismatch_is_not_invoked() {
        let npm = Arc::new(Recording::new("npm", "**/package.json"));
        let mut registry = ContributorRegistry::new();
        registry.register(npm.clone());

        let outcome = run(&registry, "a/setup.py");
        assert!(npm.calls().is_empty());
        assert!(outcome.descriptors.is_empty());
    }

    #[test]
    fn results_accumulate_across_phases() {
        let os = Arc::new(Recording {
            phase: 10,
            ..Recording::new("os", "/record")
        });
        let python = Arc::new(Recording {
            phase: 50,
            ..Recording::new("python", "**/*.dist-info/record")
        });
        let mut registry = ContributorRegistry::new();
        registry.register(python.clone());
        registry.register(os.clone());

        let outcome = run(&registry, "usr/lib/foo-1.0.dist-info/RECORD");
        let provenance: Vec<&str> = outcome
            .descriptors
            .iter()
            .map(|d| d.provenance.as_str())
            .collect();
        assert_eq!(provenance, vec!["os", "python"]);
    }
}
