//! 규칙 파일 로더 -- TOML 컨트리뷰터 규칙을 디스크에서 로드합니다.
//!
//! 규칙 디렉토리 내의 `.toml` 파일을 스캔하고 `[[contributor]]` 테이블을 파싱합니다.
//! 개별 파일 파싱 실패는 경고 로그를 남기고 건너뜁니다.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::PatternEngineError;

use super::declarative::ContributorRule;

/// 규칙 파일 로더 설정
const MAX_RULE_FILE_SIZE: u64 = 1024 * 1024; // 1MB
const MAX_RULES_COUNT: usize = 10_000;

/// 규칙 파일 한 개의 구조
#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    contributor: Vec<ContributorRule>,
}

/// 규칙 파일 로더
pub struct RuleLoader;

impl RuleLoader {
    /// 디렉토리에서 모든 TOML 규칙 파일을 로드합니다.
    ///
    /// 파일은 이름 순서로 처리되며, 먼저 나온 규칙 ID가 우선합니다.
    /// 개별 파일 로딩 실패와 중복 ID는 경고 로그를 남기고 건너뜁니다.
    ///
    /// # Errors
    /// - 디렉토리를 읽을 수 없는 경우
    /// - 규칙 수가 `MAX_RULES_COUNT`를 초과하는 경우
    pub async fn load_directory(
        dir: impl AsRef<Path>,
    ) -> Result<Vec<ContributorRule>, PatternEngineError> {
        let dir = dir.as_ref();

        let mut entries =
            tokio::fs::read_dir(dir)
                .await
                .map_err(|e| PatternEngineError::RuleLoad {
                    path: dir.display().to_string(),
                    reason: format!("failed to read directory: {e}"),
                })?;

        let mut paths: Vec<PathBuf> = Vec::new();
        while let Some(entry) =
            entries
                .next_entry()
                .await
                .map_err(|e| PatternEngineError::RuleLoad {
                    path: dir.display().to_string(),
                    reason: format!("failed to read directory entry: {e}"),
                })?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut rules = Vec::new();
        let mut seen_ids = HashSet::new();

        for path in paths {
            let loaded = match Self::load_file(&path).await {
                Ok(loaded) => loaded,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load rule file, skipping"
                    );
                    continue;
                }
            };

            for rule in loaded {
                if !seen_ids.insert(rule.id.clone()) {
                    tracing::warn!(
                        rule_id = %rule.id,
                        path = %path.display(),
                        "duplicate contributor id, skipping"
                    );
                    continue;
                }
                rules.push(rule);
            }

            if rules.len() > MAX_RULES_COUNT {
                return Err(PatternEngineError::RuleLoad {
                    path: dir.display().to_string(),
                    reason: format!("too many rules: max {MAX_RULES_COUNT}"),
                });
            }
        }

        tracing::info!(
            dir = %dir.display(),
            count = rules.len(),
            "loaded contributor rules"
        );

        Ok(rules)
    }

    /// 단일 TOML 파일에서 규칙을 로드합니다.
    pub async fn load_file(
        path: impl AsRef<Path>,
    ) -> Result<Vec<ContributorRule>, PatternEngineError> {
        let path = path.as_ref();

        // 파일 크기 검증
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| PatternEngineError::RuleLoad {
                path: path.display().to_string(),
                reason: format!("failed to read file metadata: {e}"),
            })?;

        if metadata.len() > MAX_RULE_FILE_SIZE {
            return Err(PatternEngineError::RuleLoad {
                path: path.display().to_string(),
                reason: format!(
                    "file too large: {} bytes (max: {MAX_RULE_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| PatternEngineError::RuleLoad {
                    path: path.display().to_string(),
                    reason: format!("failed to read file: {e}"),
                })?;

        Self::parse_toml(&content, &path.display().to_string())
    }

    /// TOML 문자열을 파싱하여 규칙 목록을 생성합니다.
    ///
    /// 규칙 하나라도 유효하지 않으면 파일 전체를 거부합니다.
    pub fn parse_toml(
        toml_str: &str,
        source: &str,
    ) -> Result<Vec<ContributorRule>, PatternEngineError> {
        let file: RuleFile = toml::from_str(toml_str).map_err(|e| PatternEngineError::RuleLoad {
            path: source.to_owned(),
            reason: format!("TOML parse error: {e}"),
        })?;

        for rule in &file.contributor {
            rule.validate().map_err(|e| PatternEngineError::RuleLoad {
                path: source.to_owned(),
                reason: e.to_string(),
            })?;
        }

        Ok(file.contributor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorMode;

    const NPM_RULES: &str = r#"
[[contributor]]
id = "node-module"
suffixes = ["node_modules/*/package.json"]
component = "{dir}"
version = "1.0.0"
include = "{dir}/**"
pin_checksum = true

[[contributor]]
id = "os-release"
phase = 10
suffixes = ["etc/os-release"]
component = "os"
anchor = "*"
mode = "deferred"
no_file_match_required = true
"#;

    #[test]
    fn parse_valid_toml() {
        let rules = RuleLoader::parse_toml(NPM_RULES, "npm.toml").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, "node-module");
        assert_eq!(rules[0].phase, 100);
        assert_eq!(rules[0].anchor_segments, 2);
        assert_eq!(rules[1].mode, DescriptorMode::Deferred);
        assert_eq!(rules[1].version, "unspecific");
        assert!(rules[1].no_file_match_required);
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let result = RuleLoader::parse_toml("[[contributor]\nid = ", "bad.toml");
        assert!(matches!(result, Err(PatternEngineError::RuleLoad { .. })));
    }

    #[test]
    fn parse_rejects_invalid_rule() {
        let toml = r#"
[[contributor]]
id = "broken"
suffixes = []
component = "x"
"#;
        let err = RuleLoader::parse_toml(toml, "broken.toml").unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn parse_rejects_pinned_root_anchor() {
        let toml = r#"
[[contributor]]
id = "debian"
suffixes = ["etc/os-release"]
component = "debian"
version = "12"
anchor = "*"
pin_checksum = true
"#;
        let err = RuleLoader::parse_toml(toml, "os.toml").unwrap_err();
        assert!(matches!(err, PatternEngineError::RuleLoad { .. }));
        assert!(err.to_string().contains("pin_checksum"));
    }

    #[test]
    fn empty_file_has_no_rules() {
        assert!(RuleLoader::parse_toml("", "empty.toml").unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_nonexistent_directory_returns_error() {
        let result = RuleLoader::load_directory("/nonexistent/path/contributors").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn load_directory_skips_bad_files_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.toml"), NPM_RULES)
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("b.toml"), "not = [valid")
            .await
            .unwrap();
        tokio::fs::write(
            dir.path().join("c.toml"),
            "[[contributor]]\nid = \"node-module\"\nsuffixes = [\"x\"]\ncomponent = \"dup\"\n",
        )
        .await
        .unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "ignored")
            .await
            .unwrap();

        let rules = RuleLoader::load_directory(dir.path()).await.unwrap();
        let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["node-module", "os-release"]);
        assert_eq!(rules[0].component, "{dir}");
    }
}
