//! 선언형 컨트리뷰터 -- TOML 규칙 하나로 정의하는 범용 탐지기
//!
//! 파일 내용을 읽지 않고, 경로와 체크섬만으로 디스크립터를 만듭니다.
//! 컴포넌트 이름과 버전에는 다음 자리표시자를 쓸 수 있습니다.
//!
//! - `{dir}`: 앵커 파일의 부모 디렉토리 이름
//! - `{file}`: 앵커 파일 이름
//!
//! include/exclude에 들어가는 자리표시자 값은 글롭 메타문자가 이스케이프되어
//! 경로 이름 그대로만 매칭합니다.
//!
//! # 규칙 예시
//!
//! ```toml
//! [[contributor]]
//! id = "node-module"
//! phase = 100
//! suffixes = ["node_modules/*/package.json"]
//! component = "{dir}"
//! version = "1.0.0"
//! include = "{dir}/**"
//! anchor_segments = 2
//! pin_checksum = true
//! ```

use serde::{Deserialize, Serialize};

use compscan_core::context::ScanContext;
use compscan_core::types::WILDCARD_CHECKSUM;

use super::{ComponentPatternContributor, ContributorError, DEFAULT_PHASE};
use crate::descriptor::{
    ComponentPatternDescriptor, DescriptorMode, ROOT_ANCHORS, UNSPECIFIC_VERSION,
};
use crate::error::PatternEngineError;
use crate::pattern::escape_literal;

fn default_phase() -> u32 {
    DEFAULT_PHASE
}

fn default_version() -> String {
    UNSPECIFIC_VERSION.to_owned()
}

fn default_anchor_segments() -> usize {
    2
}

/// 선언형 컨트리뷰터 규칙
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorRule {
    /// 규칙 ID (provenance)
    pub id: String,
    /// 실행 phase
    #[serde(default = "default_phase")]
    pub phase: u32,
    /// 소문자 접미어 와일드카드 목록
    pub suffixes: Vec<String>,
    /// 컴포넌트 이름 (자리표시자 허용)
    pub component: String,
    /// 버전 (자리표시자 허용)
    ///
    /// 생략하면 `unspecific`이며, 추출 단계는 이 버전의 디스크립터를 저장하지 않습니다.
    #[serde(default = "default_version")]
    pub version: String,
    /// include 글롭 (콤마 구분, 자리표시자 허용)
    #[serde(default)]
    pub include: String,
    /// exclude 글롭 (콤마 구분, 자리표시자 허용)
    #[serde(default)]
    pub exclude: String,
    /// 고정 버전 앵커. 없으면 매칭된 경로의 마지막 `anchor_segments` 세그먼트
    #[serde(default)]
    pub anchor: Option<String>,
    /// 앵커로 사용할 경로 세그먼트 수
    #[serde(default = "default_anchor_segments")]
    pub anchor_segments: usize,
    /// 앵커 체크섬을 파일 체크섬으로 고정할지 여부 (false면 `*`)
    ///
    /// 루트 앵커(`*`, `.`)와 함께 쓸 수 없습니다.
    #[serde(default)]
    pub pin_checksum: bool,
    /// 매칭 모드
    #[serde(default)]
    pub mode: DescriptorMode,
    /// 흡수 파일 없이도 컴포넌트 유지
    #[serde(default)]
    pub no_file_match_required: bool,
    /// 컴포넌트 유형
    #[serde(default)]
    pub component_type: Option<String>,
    /// 이 문자열을 포함하는 경로에만 적용 (소문자 비교)
    #[serde(default)]
    pub require_path: Option<String>,
}

impl ContributorRule {
    /// 규칙의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), PatternEngineError> {
        let invalid = |reason: String| PatternEngineError::RuleLoad {
            path: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("rule id must not be empty".to_owned()));
        }
        if self.suffixes.iter().all(|s| s.trim().is_empty()) {
            return Err(invalid("at least one suffix is required".to_owned()));
        }
        if self.component.trim().is_empty() {
            return Err(invalid("component must not be empty".to_owned()));
        }
        if self.anchor_segments == 0 {
            return Err(invalid("anchor_segments must be at least 1".to_owned()));
        }
        if let Some(anchor) = self.anchor.as_deref().filter(|a| a.contains("**")) {
            return Err(invalid(format!("anchor '{anchor}' must not contain '**'")));
        }
        if let Some(anchor) = self
            .anchor
            .as_deref()
            .filter(|a| self.pin_checksum && is_root_sentinel(a))
        {
            return Err(invalid(format!(
                "root anchor '{anchor}' cannot be combined with pin_checksum"
            )));
        }
        Ok(())
    }
}

fn is_root_sentinel(anchor: &str) -> bool {
    ROOT_ANCHORS.contains(&anchor.trim())
}

/// 선언형 컨트리뷰터
#[derive(Debug, Clone)]
pub struct DeclarativeContributor {
    rule: ContributorRule,
}

impl DeclarativeContributor {
    /// 검증된 규칙으로 컨트리뷰터를 생성합니다.
    pub fn new(rule: ContributorRule) -> Result<Self, PatternEngineError> {
        rule.validate()?;
        Ok(Self { rule })
    }

    /// 원본 규칙
    pub fn rule(&self) -> &ContributorRule {
        &self.rule
    }
}

impl ComponentPatternContributor for DeclarativeContributor {
    fn id(&self) -> &str {
        &self.rule.id
    }

    fn phase(&self) -> u32 {
        self.rule.phase
    }

    fn suffixes(&self) -> Vec<String> {
        self.rule.suffixes.clone()
    }

    fn applies(&self, lower_path: &str) -> bool {
        self.rule
            .require_path
            .as_deref()
            .is_none_or(|required| lower_path.contains(&required.to_lowercase()))
    }

    fn contribute(
        &self,
        _base_dir: &str,
        relative_path: &str,
        checksum: &str,
        _context: &ScanContext,
    ) -> Result<Vec<ComponentPatternDescriptor>, ContributorError> {
        let segments: Vec<&str> = relative_path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let Some((file, parents)) = segments.split_last() else {
            return Err(ContributorError::Malformed {
                path: relative_path.to_owned(),
                reason: "empty path".to_owned(),
            });
        };
        let dir = parents.last().copied().unwrap_or_default();
        let expand = |template: &str| template.replace("{dir}", dir).replace("{file}", file);
        let (glob_dir, glob_file) = (escape_literal(dir), escape_literal(file));
        let expand_glob = |template: &str| {
            template
                .replace("{dir}", &glob_dir)
                .replace("{file}", &glob_file)
        };

        let anchor = match &self.rule.anchor {
            Some(anchor) => expand(anchor),
            None => {
                let take = self.rule.anchor_segments.min(segments.len());
                segments[segments.len() - take..].join("/")
            }
        };
        // 경로 이름에서 온 앵커가 `**`나 고정 체크섬 루트 앵커가 되면 이 파일만 거부
        if anchor.contains("**") || (self.rule.pin_checksum && is_root_sentinel(&anchor)) {
            return Err(ContributorError::Malformed {
                path: relative_path.to_owned(),
                reason: format!("path yields unusable anchor '{anchor}'"),
            });
        }
        let anchor_checksum = if self.rule.pin_checksum {
            checksum
        } else {
            WILDCARD_CHECKSUM
        };

        let mut descriptor =
            ComponentPatternDescriptor::new(expand(&self.rule.component), expand(&self.rule.version))
                .with_anchor(anchor, anchor_checksum)
                .with_include(expand_glob(&self.rule.include))
                .with_exclude(expand_glob(&self.rule.exclude))
                .with_mode(self.rule.mode)
                .with_no_file_match_required(self.rule.no_file_match_required);
        if let Some(component_type) = &self.rule.component_type {
            descriptor = descriptor.with_component_type(component_type.clone());
        }

        Ok(vec![descriptor])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> ContributorRule {
        ContributorRule {
            id: "node-module".to_owned(),
            phase: DEFAULT_PHASE,
            suffixes: vec!["node_modules/*/package.json".to_owned()],
            component: "{dir}".to_owned(),
            version: "1.0.0".to_owned(),
            include: "{dir}/**".to_owned(),
            exclude: "{dir}/test/**".to_owned(),
            anchor: None,
            anchor_segments: 2,
            pin_checksum: true,
            mode: DescriptorMode::Immediate,
            no_file_match_required: false,
            component_type: Some("npm-module".to_owned()),
            require_path: None,
        }
    }

    fn contribute(contributor: &DeclarativeContributor, path: &str) -> ComponentPatternDescriptor {
        let context = ScanContext::new("/scan");
        let mut descriptors = contributor.contribute("/scan", path, "H1", &context).unwrap();
        assert_eq!(descriptors.len(), 1);
        descriptors.remove(0)
    }

    #[test]
    fn placeholders_and_default_anchor() {
        let contributor = DeclarativeContributor::new(rule()).unwrap();
        let desc = contribute(&contributor, "app/node_modules/foo/package.json");

        assert_eq!(desc.component_name, "foo");
        assert_eq!(desc.part, "foo-1.0.0");
        assert_eq!(desc.anchor(), Some("foo/package.json"));
        assert_eq!(desc.anchor_checksum(), Some("H1"));
        assert_eq!(desc.include_pattern, "foo/**");
        assert_eq!(desc.exclude_pattern, "foo/test/**");
        assert_eq!(desc.component_type.as_deref(), Some("npm-module"));
    }

    #[test]
    fn unpinned_checksum_is_wildcard() {
        let contributor = DeclarativeContributor::new(ContributorRule {
            pin_checksum: false,
            ..rule()
        })
        .unwrap();
        let desc = contribute(&contributor, "app/node_modules/foo/package.json");
        assert!(desc.accepts_any_checksum());
    }

    #[test]
    fn explicit_anchor_wins() {
        let contributor = DeclarativeContributor::new(ContributorRule {
            anchor: Some("*".to_owned()),
            pin_checksum: false,
            no_file_match_required: true,
            ..rule()
        })
        .unwrap();
        let desc = contribute(&contributor, "etc/os-release");
        assert!(desc.is_root_anchor());
        assert!(desc.no_file_match_required);
    }

    #[test]
    fn anchor_segments_larger_than_path_uses_whole_path() {
        let contributor = DeclarativeContributor::new(ContributorRule {
            anchor_segments: 5,
            ..rule()
        })
        .unwrap();
        let desc = contribute(&contributor, "foo/package.json");
        assert_eq!(desc.anchor(), Some("foo/package.json"));
    }

    #[test]
    fn require_path_gates_applies() {
        let contributor = DeclarativeContributor::new(ContributorRule {
            require_path: Some("Node_Modules/".to_owned()),
            ..rule()
        })
        .unwrap();
        assert!(contributor.applies("app/node_modules/foo/package.json"));
        assert!(!contributor.applies("app/package.json"));
    }

    #[test]
    fn validate_rejects_recursive_anchor() {
        let result = DeclarativeContributor::new(ContributorRule {
            anchor: Some("**/package.json".to_owned()),
            ..rule()
        });
        assert!(matches!(result, Err(PatternEngineError::RuleLoad { .. })));
    }

    #[test]
    fn validate_rejects_pinned_root_anchor() {
        for anchor in ["*", "."] {
            let result = ContributorRule {
                anchor: Some(anchor.to_owned()),
                pin_checksum: true,
                ..rule()
            }
            .validate();
            assert!(matches!(result, Err(PatternEngineError::RuleLoad { .. })));
        }
    }

    #[test]
    fn placeholder_values_are_glob_escaped() {
        let contributor = DeclarativeContributor::new(rule()).unwrap();
        let desc = contribute(&contributor, "app/node_modules/weird[/package.json");

        assert_eq!(desc.component_name, "weird[");
        assert_eq!(desc.anchor(), Some("weird[/package.json"));
        assert_eq!(desc.include_pattern, "weird[[]/**");
        let include = crate::pattern::GlobList::parse(&desc.include_pattern).unwrap();
        assert!(include.is_match("weird[/index.js"));
    }

    #[test]
    fn recursive_anchor_from_path_is_malformed() {
        let contributor = DeclarativeContributor::new(rule()).unwrap();
        let context = ScanContext::new("/scan");
        let result = contributor.contribute("/scan", "app/**/package.json", "H1", &context);
        assert!(matches!(result, Err(ContributorError::Malformed { .. })));
    }

    #[test]
    fn validate_rejects_missing_suffixes_and_component() {
        assert!(
            ContributorRule {
                suffixes: vec![" ".to_owned()],
                ..rule()
            }
            .validate()
            .is_err()
        );
        assert!(
            ContributorRule {
                component: String::new(),
                ..rule()
            }
            .validate()
            .is_err()
        );
        assert!(
            ContributorRule {
                anchor_segments: 0,
                ..rule()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn empty_path_is_malformed() {
        let contributor = DeclarativeContributor::new(rule()).unwrap();
        let context = ScanContext::new("/scan");
        let result = contributor.contribute("/scan", "", "H1", &context);
        assert!(matches!(result, Err(ContributorError::Malformed { .. })));
    }
}
