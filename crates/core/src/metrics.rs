//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 익스포터 설치는 이 워크스페이스의 책임이 아닙니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `compscan_`
//! - 모듈명: `extraction_`, `matching_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency)
//!
//! # 사용 예시
//!
//! ```ignore
//! use compscan_core::metrics as m;
//!
//! metrics::counter!(m::MATCHING_ARTIFACTS_ABSORBED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 컨트리뷰터 ID 레이블 키
pub const LABEL_CONTRIBUTOR: &str = "contributor";

/// 매칭 모드 레이블 키 (immediate, deferred)
pub const LABEL_MODE: &str = "mode";

// ─── Extraction 메트릭 ──────────────────────────────────────────────

/// Extraction: 디스패치된 파일 수 (counter)
pub const EXTRACTION_FILES_DISPATCHED_TOTAL: &str = "compscan_extraction_files_dispatched_total";

/// Extraction: 패턴 저장소에 추가된 디스크립터 수 (counter)
pub const EXTRACTION_DESCRIPTORS_ACCEPTED_TOTAL: &str =
    "compscan_extraction_descriptors_accepted_total";

/// Extraction: 컨트리뷰터 실행 실패 수 (counter, label: contributor)
pub const EXTRACTION_CONTRIBUTOR_FAILURES_TOTAL: &str =
    "compscan_extraction_contributor_failures_total";

/// Extraction: 패스 소요 시간 (histogram, 초)
pub const EXTRACTION_DURATION_SECONDS: &str = "compscan_extraction_duration_seconds";

// ─── Matching 메트릭 ────────────────────────────────────────────────

/// Matching: 생성된 매칭 결과 수 (counter, label: mode)
pub const MATCHING_MATCHES_TOTAL: &str = "compscan_matching_matches_total";

/// Matching: 흡수 파일이 없어 버려진 매칭 수 (counter)
pub const MATCHING_MATCHES_DROPPED_TOTAL: &str = "compscan_matching_matches_dropped_total";

/// Matching: 흡수된 아티팩트 수 (counter)
pub const MATCHING_ARTIFACTS_ABSORBED_TOTAL: &str = "compscan_matching_artifacts_absorbed_total";

/// Matching: 적용된 확장 인벤토리 수 (counter)
pub const MATCHING_EXPANSIONS_TOTAL: &str = "compscan_matching_expansions_total";

/// Matching: 매칭 + 적용 소요 시간 (histogram, 초, label: mode)
pub const MATCHING_DURATION_SECONDS: &str = "compscan_matching_duration_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    // Extraction
    describe_counter!(
        EXTRACTION_FILES_DISPATCHED_TOTAL,
        "Total number of scanned files dispatched to contributors"
    );
    describe_counter!(
        EXTRACTION_DESCRIPTORS_ACCEPTED_TOTAL,
        "Total number of component pattern descriptors accepted into the pattern store"
    );
    describe_counter!(
        EXTRACTION_CONTRIBUTOR_FAILURES_TOTAL,
        "Total number of contributor invocations that returned an error"
    );
    describe_histogram!(
        EXTRACTION_DURATION_SECONDS,
        "Time to complete one extraction pass in seconds"
    );

    // Matching
    describe_counter!(
        MATCHING_MATCHES_TOTAL,
        "Total number of anchor matches produced"
    );
    describe_counter!(
        MATCHING_MATCHES_DROPPED_TOTAL,
        "Total number of matches dropped because they absorbed no files"
    );
    describe_counter!(
        MATCHING_ARTIFACTS_ABSORBED_TOTAL,
        "Total number of artifacts absorbed into matched components"
    );
    describe_counter!(
        MATCHING_EXPANSIONS_TOTAL,
        "Total number of expansion inventories merged into the scan"
    );
    describe_histogram!(
        MATCHING_DURATION_SECONDS,
        "Time to match and apply one descriptor set in seconds"
    );
}
