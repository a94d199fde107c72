//! 컨트리뷰터 레지스트리 -- `(phase, suffix)` 단위 버킷

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::ComponentPatternContributor;

/// 같은 접미어를 공유하는 컨트리뷰터 묶음 (등록 순서 유지)
pub struct SuffixGroup {
    /// 소문자 접미어 와일드카드
    pub suffix: String,
    /// 등록 순서대로 정렬된 컨트리뷰터
    pub contributors: Vec<Arc<dyn ComponentPatternContributor>>,
}

/// 컨트리뷰터 레지스트리
///
/// phase 오름차순, 같은 phase 안에서는 등록 순서로 순회합니다.
#[derive(Default)]
pub struct ContributorRegistry {
    phases: BTreeMap<u32, Vec<SuffixGroup>>,
    ids: Vec<String>,
}

impl ContributorRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 컨트리뷰터를 선언한 모든 `(phase, suffix)` 버킷에 등록합니다.
    ///
    /// 접미어가 없는 컨트리뷰터는 설정 오류로 로그만 남기고 등록하지 않습니다.
    pub fn register(&mut self, contributor: Arc<dyn ComponentPatternContributor>) {
        let suffixes: Vec<String> = contributor
            .suffixes()
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        if suffixes.is_empty() {
            warn!(
                contributor = contributor.id(),
                "contributor declares no suffixes, not registered"
            );
            return;
        }

        let phase = contributor.phase();
        let groups = self.phases.entry(phase).or_default();
        for suffix in suffixes {
            match groups.iter_mut().find(|g| g.suffix == suffix) {
                Some(group) => group.contributors.push(Arc::clone(&contributor)),
                None => groups.push(SuffixGroup {
                    suffix,
                    contributors: vec![Arc::clone(&contributor)],
                }),
            }
        }

        debug!(contributor = contributor.id(), phase, "registered contributor");
        self.ids.push(contributor.id().to_owned());
    }

    /// phase 오름차순으로 버킷을 순회합니다.
    pub fn all_buckets(&self) -> impl Iterator<Item = (u32, &[SuffixGroup])> {
        self.phases
            .iter()
            .map(|(phase, groups)| (*phase, groups.as_slice()))
    }

    /// 등록된 컨트리뷰터 ID (등록 순서)
    pub fn contributor_ids(&self) -> &[String] {
        &self.ids
    }

    /// 등록된 컨트리뷰터 수
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl std::fmt::Debug for ContributorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContributorRegistry")
            .field("phases", &self.phases.keys().collect::<Vec<_>>())
            .field("contributors", &self.ids)
            .finish()
    }
}
