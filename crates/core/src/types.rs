//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 스캔된 파일, 아티팩트, 에셋 레코드 등 모든 모듈이 공유하는 데이터 구조를 정의합니다.
//! 외부 파일 워커가 [`ScannedFile`]을 생성하고, 패턴 엔진은 [`Artifact`]를 변경하며,
//! 인벤토리 작성기는 최종 아티팩트를 그대로 넘겨받습니다.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// 와일드카드 체크섬 -- 어떤 내용이든 허용
pub const WILDCARD_CHECKSUM: &str = "*";

/// 스캔된 파일 (외부 입력, 읽기 전용)
///
/// 파일 워커가 스캔 1회당 한 번 생성합니다. 경로는 스캔 루트 기준 상대 경로입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedFile {
    /// 스캔 루트 기준 경로
    pub path: String,
    /// 사전 계산된 내용 해시 (알고리즘 무관)
    #[serde(default)]
    pub checksum: Option<String>,
    /// 이 파일이 발견된 루트 경로 집합
    #[serde(default)]
    pub root_paths: BTreeSet<String>,
}

impl ScannedFile {
    /// 경로와 체크섬으로 스캔 파일을 생성합니다.
    pub fn new(path: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            checksum: Some(checksum.into()),
            root_paths: BTreeSet::new(),
        }
    }
}

/// 아티팩트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// 스캔된 개별 파일
    File,
    /// 매칭으로 합성된 컴포넌트
    Component,
    /// 확장 인벤토리에서 추가된 아티팩트
    Expanded,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Component => write!(f, "component"),
            Self::Expanded => write!(f, "expanded"),
        }
    }
}

/// 에셋 마커 값
///
/// 아티팩트와 에셋(컨테이너 이미지, 아카이브, 컴포넌트) 사이의 관계를 나타냅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetMarker {
    /// 에셋이 아티팩트를 기술함
    Describes,
    /// 에셋이 아티팩트를 포함함
    Contains,
    /// 개발 전용 의존성
    DevelopmentDependency,
    /// 삭제 대상
    Delete,
}

impl fmt::Display for AssetMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Describes => write!(f, "describes"),
            Self::Contains => write!(f, "contains"),
            Self::DevelopmentDependency => write!(f, "development-dependency"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// 스캔 지시자
///
/// 후속 처리 단계에 아티팩트 처리 방식을 알립니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ScanDirective {
    /// 컴포넌트에 흡수됨 -- 보고 대상에서 제거해야 함
    Delete,
}

/// 아티팩트
///
/// 스캔된 파일 하나 또는 합성된 컴포넌트 하나를 나타내는 가변 레코드입니다.
///
/// # 불변 조건
///
/// `scan_directive == Some(ScanDirective::Delete)`는 아티팩트가 어떤 매칭된
/// 컴포넌트에 흡수되었을 때, 그리고 그때에만 성립합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// 아티팩트 식별자 (파일은 파일명, 컴포넌트는 `이름-버전`)
    pub id: String,
    /// 아티팩트 종류
    pub kind: ArtifactKind,
    /// 컴포넌트 이름
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// 버전
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// 체크섬
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// 에셋 내 경로 (스캔 루트 기준)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_in_asset: Option<String>,
    /// 루트 경로 집합
    #[serde(default)]
    pub root_paths: BTreeSet<String>,
    /// 이 아티팩트가 기술하는 에셋 ID (컴포넌트 아티팩트만)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    /// 에셋 ID별 마커
    #[serde(default)]
    pub markers: BTreeMap<String, AssetMarker>,
    /// 스캔 지시자
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_directive: Option<ScanDirective>,
    /// 자유 형식 속성 (컴포넌트 유형, 출처 등)
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Artifact {
    /// 빈 아티팩트를 생성합니다.
    pub fn new(id: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            id: id.into(),
            kind,
            component: None,
            version: None,
            checksum: None,
            path_in_asset: None,
            root_paths: BTreeSet::new(),
            asset_id: None,
            markers: BTreeMap::new(),
            scan_directive: None,
            attributes: BTreeMap::new(),
        }
    }

    /// 스캔된 파일에서 파일 아티팩트를 생성합니다.
    ///
    /// ID는 경로의 마지막 세그먼트(파일명)입니다.
    pub fn from_scanned(file: &ScannedFile) -> Self {
        let path = normalize_path(&file.path);
        let id = path.rsplit('/').next().unwrap_or(path.as_str()).to_owned();
        Self {
            checksum: file.checksum.clone(),
            path_in_asset: Some(path),
            root_paths: file.root_paths.clone(),
            ..Self::new(id, ArtifactKind::File)
        }
    }

    /// 컴포넌트에 흡수되어 삭제 대상인지 여부를 반환합니다.
    pub fn is_absorbed(&self) -> bool {
        self.scan_directive == Some(ScanDirective::Delete)
    }

    /// 아티팩트를 흡수 처리합니다.
    ///
    /// 삭제 지시자를 설정하고 에셋 ID 체인의 각 에셋에 `contains` 마커를 기록합니다.
    pub fn absorb<'a>(&mut self, asset_id_chain: impl IntoIterator<Item = &'a String>) {
        self.scan_directive = Some(ScanDirective::Delete);
        self.mark_all(asset_id_chain, AssetMarker::Contains);
    }

    /// 주어진 에셋 ID 모두에 마커를 기록합니다. 기존 마커는 덮어쓰지 않습니다.
    pub fn mark_all<'a>(
        &mut self,
        asset_ids: impl IntoIterator<Item = &'a String>,
        marker: AssetMarker,
    ) {
        for asset_id in asset_ids {
            self.markers.entry(asset_id.clone()).or_insert(marker);
        }
    }

    /// 정규화된 경로를 반환합니다 (경로가 없으면 None).
    pub fn normalized_path(&self) -> Option<String> {
        self.path_in_asset.as_deref().map(normalize_path)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.version, &self.path_in_asset) {
            (Some(v), Some(p)) => write!(f, "{}@{} ({}, {})", self.id, v, self.kind, p),
            (Some(v), None) => write!(f, "{}@{} ({})", self.id, v, self.kind),
            (None, Some(p)) => write!(f, "{} ({}, {})", self.id, self.kind, p),
            (None, None) => write!(f, "{} ({})", self.id, self.kind),
        }
    }
}

/// 에셋 레코드
///
/// 컨테이너 이미지, 아카이브 등 아티팩트를 묶는 상위 단위의 메타데이터입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// 에셋 ID
    pub asset_id: String,
    /// 속성
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl AssetRecord {
    /// 속성 없는 에셋 레코드를 생성합니다.
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            attributes: BTreeMap::new(),
        }
    }
}

/// 경로를 비교 가능한 형태로 정규화합니다.
///
/// - 역슬래시를 `/`로 변환
/// - 선행 `./`와 `/` 제거
/// - 연속된 `/`와 후행 `/` 제거
///
/// 대소문자는 유지합니다. 비교 시에는 [`fold_case`]를 함께 사용합니다.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    unified
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// 플랫폼/로케일과 무관한 소문자 변환
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}
