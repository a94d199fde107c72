//! 앵커 매칭과 커버리지 적용
//!
//! - [`anchor`]: 디스크립터의 버전 앵커를 스캔 파일 집합에 대해 평가하여 [`MatchResult`] 생성
//! - [`coverage`]: 매칭 결과의 include/exclude 규칙으로 파일을 흡수하고 컴포넌트 아티팩트 생성
//!
//! # 경로 기준점
//!
//! 모든 경로는 스캔 루트 기준의 정규화된 상대 경로이며 빈 문자열이 스캔 루트입니다.
//!
//! - **앵커 루트**: 앵커 경로가 시작되는 디렉토리
//!   (`foo/package.json`이 `app/node_modules/foo/package.json`에서 매칭되면 `app/node_modules`)
//! - **컴포넌트 기준 디렉토리**: 여러 세그먼트 앵커는 앵커 루트 + 첫 세그먼트,
//!   단일 세그먼트 앵커는 앵커 루트 자체 (위 예시에서 `app/node_modules/foo`)

pub mod anchor;
pub mod coverage;

use std::collections::BTreeSet;

use crate::descriptor::ComponentPatternDescriptor;

pub use anchor::{match_all, validate_descriptor};
pub use coverage::{ApplyOptions, ApplySummary, ExpansionLedger, apply_matches};

/// 디스크립터 하나와 그 앵커를 만족한 위치의 쌍
///
/// 매칭/적용 패스 동안에만 존재하며 저장되지 않습니다.
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    /// 매칭된 디스크립터
    pub descriptor: &'a ComponentPatternDescriptor,
    /// 앵커를 만족한 파일 경로 (루트 앵커면 None)
    pub anchor_path: Option<String>,
    /// 매칭된 체크섬 (와일드카드 앵커에서 파일 체크섬이 없으면 `*`)
    pub anchor_checksum: String,
    /// 스캔 루트 (디스크 경로)
    pub scan_root: String,
    /// 앵커 루트
    pub anchor_root: String,
    /// 컴포넌트 기준 디렉토리
    pub base_dir: String,
    /// 소유 계보 (바깥쪽 에셋부터)
    pub asset_id_chain: Vec<String>,
    /// 앵커 파일의 루트 경로
    pub root_paths: BTreeSet<String>,
}

/// 앵커의 경로 세그먼트 수 (`/` 개수 + 1, 빈 세그먼트 제외)
pub fn anchor_segment_count(anchor: &str) -> usize {
    anchor.split('/').filter(|s| !s.is_empty()).count()
}

/// 매칭된 파일 경로에서 앵커 루트와 컴포넌트 기준 디렉토리를 계산합니다.
///
/// 파일의 부모에서 `segments - 1`단계 올라간 곳이 앵커 루트입니다.
/// 경로가 앵커보다 짧으면 둘 다 스캔 루트(빈 문자열)입니다.
pub fn ownership_roots(path: &str, segments: usize) -> (String, String) {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments == 0 || parts.len() < segments {
        return (String::new(), String::new());
    }

    let root_len = parts.len() - segments;
    let anchor_root = parts[..root_len].join("/");
    let base_dir = if segments > 1 {
        parts[..=root_len].join("/")
    } else {
        anchor_root.clone()
    };
    (anchor_root, base_dir)
}
