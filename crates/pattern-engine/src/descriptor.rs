//! 컴포넌트 패턴 디스크립터
//!
//! [`ComponentPatternDescriptor`]는 컨트리뷰터가 생성하고 매칭 엔진이 소비하는 단위입니다.
//! 앵커(버전 앵커 경로 + 체크섬)로 컴포넌트 인스턴스를 찾고,
//! include/exclude 패턴으로 컴포넌트가 소유하는 파일 범위를 정합니다.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use compscan_core::types::{Artifact, AssetRecord, WILDCARD_CHECKSUM};

use crate::contributor::ContributorError;

/// 아직 확정되지 않은 버전을 나타내는 값
///
/// 이 버전을 가진 디스크립터는 추출 패스에서 건너뜁니다.
pub const UNSPECIFIC_VERSION: &str = "unspecific";

/// 스캔 루트 전체를 가리키는 앵커 값
pub const ROOT_ANCHORS: [&str; 2] = ["*", "."];

/// 디스크립터 매칭 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorMode {
    /// 첫 번째 매칭 패스에서 적용
    #[default]
    Immediate,
    /// 중첩 아카이브 해제 등 후속 단계 이후 적용
    Deferred,
}

impl DescriptorMode {
    /// 매칭 진입점의 `deferred` 플래그에서 모드를 결정합니다.
    pub fn from_deferred(deferred: bool) -> Self {
        if deferred {
            Self::Deferred
        } else {
            Self::Immediate
        }
    }

    /// 지연 모드 여부
    pub fn is_deferred(self) -> bool {
        self == Self::Deferred
    }
}

impl fmt::Display for DescriptorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => write!(f, "immediate"),
            Self::Deferred => write!(f, "deferred"),
        }
    }
}

/// 확장 인벤토리
///
/// 컴포넌트가 소유한 하위 아티팩트 집합 (예: 패키지 매니저의 의존성 목록).
#[derive(Debug, Clone, Default)]
pub struct ExpandedInventory {
    /// 추가될 아티팩트
    pub artifacts: Vec<Artifact>,
    /// 추가될 하위 에셋
    pub assets: Vec<AssetRecord>,
    /// 공급자가 에셋 ID 마커를 직접 관리하는지 여부
    ///
    /// `true`이면 엔진은 확장 아티팩트에 에셋 ID 체인을 기록하지 않습니다.
    pub manages_asset_ids: bool,
}

/// 확장 인벤토리 공급자
///
/// 매칭된 컴포넌트마다 한 번이 아니라, 공급자 인스턴스(`Arc`)마다 최대 한 번 호출됩니다.
pub trait InventorySupplier: Send + Sync + fmt::Debug {
    /// 확장 인벤토리를 생성합니다.
    fn supply(&self) -> Result<ExpandedInventory, ContributorError>;
}

/// 컴포넌트 패턴 디스크립터
#[derive(Debug, Clone)]
pub struct ComponentPatternDescriptor {
    /// 컴포넌트 이름
    pub component_name: String,
    /// 버전
    pub version: String,
    /// 이름-버전 조합 (컴포넌트 아티팩트 ID)
    pub part: String,
    /// 콤마로 구분된 include 글롭 목록
    pub include_pattern: String,
    /// 콤마로 구분된 exclude 글롭 목록
    pub exclude_pattern: String,
    /// 버전 앵커 (단일 세그먼트 와일드카드 `*` 허용, `**` 금지)
    pub version_anchor: Option<String>,
    /// 앵커 체크섬 (`*`이면 내용 무관)
    pub version_anchor_checksum: Option<String>,
    /// 매칭 모드
    pub mode: DescriptorMode,
    /// 디스크립터를 생성한 컨트리뷰터 ID
    pub provenance: String,
    /// 흡수 파일이 없어도 컴포넌트를 유지할지 여부
    pub no_file_match_required: bool,
    /// 컴포넌트 유형 (예: "npm-module", "container")
    pub component_type: Option<String>,
    /// 확장 인벤토리 공급자
    pub expansion: Option<Arc<dyn InventorySupplier>>,
}

impl ComponentPatternDescriptor {
    /// 이름과 버전으로 디스크립터를 생성합니다. 앵커는 비어 있습니다.
    pub fn new(component_name: impl Into<String>, version: impl Into<String>) -> Self {
        let component_name = component_name.into();
        let version = version.into();
        let part = format!("{component_name}-{version}");
        Self {
            component_name,
            version,
            part,
            include_pattern: String::new(),
            exclude_pattern: String::new(),
            version_anchor: None,
            version_anchor_checksum: None,
            mode: DescriptorMode::Immediate,
            provenance: String::new(),
            no_file_match_required: false,
            component_type: None,
            expansion: None,
        }
    }

    /// 버전 앵커와 체크섬을 설정합니다.
    pub fn with_anchor(mut self, anchor: impl Into<String>, checksum: impl Into<String>) -> Self {
        self.version_anchor = Some(anchor.into());
        self.version_anchor_checksum = Some(checksum.into());
        self
    }

    /// include 패턴을 설정합니다.
    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.include_pattern = include.into();
        self
    }

    /// exclude 패턴을 설정합니다.
    pub fn with_exclude(mut self, exclude: impl Into<String>) -> Self {
        self.exclude_pattern = exclude.into();
        self
    }

    /// 매칭 모드를 설정합니다.
    pub fn with_mode(mut self, mode: DescriptorMode) -> Self {
        self.mode = mode;
        self
    }

    /// 흡수 파일 없이도 유지되도록 설정합니다.
    pub fn with_no_file_match_required(mut self, value: bool) -> Self {
        self.no_file_match_required = value;
        self
    }

    /// 컴포넌트 유형을 설정합니다.
    pub fn with_component_type(mut self, component_type: impl Into<String>) -> Self {
        self.component_type = Some(component_type.into());
        self
    }

    /// 확장 인벤토리 공급자를 설정합니다.
    pub fn with_expansion(mut self, supplier: Arc<dyn InventorySupplier>) -> Self {
        self.expansion = Some(supplier);
        self
    }

    /// 비어 있지 않은 버전 앵커를 반환합니다.
    pub fn anchor(&self) -> Option<&str> {
        self.version_anchor.as_deref().filter(|a| !a.is_empty())
    }

    /// 비어 있지 않은 앵커 체크섬을 반환합니다.
    pub fn anchor_checksum(&self) -> Option<&str> {
        self.version_anchor_checksum
            .as_deref()
            .filter(|c| !c.is_empty())
    }

    /// 앵커가 스캔 루트 전체를 가리키는지 여부
    pub fn is_root_anchor(&self) -> bool {
        self.anchor()
            .is_some_and(|anchor| ROOT_ANCHORS.contains(&anchor.trim()))
    }

    /// 앵커 체크섬이 와일드카드인지 여부
    pub fn accepts_any_checksum(&self) -> bool {
        self.anchor_checksum() == Some(WILDCARD_CHECKSUM)
    }

    /// 버전이 아직 확정되지 않았는지 여부
    pub fn is_unspecific(&self) -> bool {
        self.version == UNSPECIFIC_VERSION
    }

    /// 중복 제거 키를 계산합니다.
    ///
    /// `이름:버전:앵커(소문자):앵커 체크섬` 형식입니다. 이름, 버전, 앵커만으로 만드는
    /// 키보다 넓어서, 같은 앵커라도 고정 체크섬이 다르면 별개의 디스크립터로 남습니다.
    pub fn qualifier(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.component_name,
            self.version,
            self.anchor().unwrap_or_default().to_lowercase(),
            self.anchor_checksum().unwrap_or_default()
        )
    }
}

impl fmt::Display for ComponentPatternDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] anchor={}",
            self.part,
            self.mode,
            self.anchor().unwrap_or("-")
        )
    }
}
