//! 스캔 컨텍스트 -- 한 번의 스캔 동안 공유되는 가변 인벤토리
//!
//! [`ScanContext`]는 패턴 엔진이 읽고 변경하는 아티팩트 컬렉션과
//! 스캔 루트, 상위 에셋 ID 체인을 보관합니다.

use tracing::debug;

use crate::types::{Artifact, ArtifactKind, AssetRecord, ScannedFile};

/// 스캔 컨텍스트
///
/// 아티팩트 추가/제거와 스캔 기준 디렉토리 조회를 제공합니다.
/// 흡수 단계는 `&mut ScanContext`를 통해서만 아티팩트를 변경하므로
/// 동시에 두 흡수 작업이 컬렉션을 구조적으로 변경할 수 없습니다.
#[derive(Debug, Clone, Default)]
pub struct ScanContext {
    /// 스캔 루트 (디스크 경로, 정보용)
    base_dir: String,
    /// 이 스캔을 감싸는 에셋 ID 체인 (바깥쪽부터)
    asset_id_chain: Vec<String>,
    /// 현재 아티팩트 컬렉션
    artifacts: Vec<Artifact>,
    /// 스캔 중 선언된 에셋
    assets: Vec<AssetRecord>,
}

impl ScanContext {
    /// 빈 컨텍스트를 생성합니다.
    pub fn new(base_dir: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// 스캔된 파일 목록으로 컨텍스트를 생성합니다.
    pub fn from_scanned_files<'a>(
        base_dir: impl Into<String>,
        files: impl IntoIterator<Item = &'a ScannedFile>,
    ) -> Self {
        let mut context = Self::new(base_dir);
        context
            .artifacts
            .extend(files.into_iter().map(Artifact::from_scanned));
        context
    }

    /// 상위 에셋 ID 체인을 설정합니다.
    pub fn with_asset_id_chain(mut self, chain: Vec<String>) -> Self {
        self.asset_id_chain = chain;
        self
    }

    /// 스캔 루트를 반환합니다.
    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    /// 상위 에셋 ID 체인을 반환합니다.
    pub fn asset_id_chain(&self) -> &[String] {
        &self.asset_id_chain
    }

    /// 현재 아티팩트 컬렉션을 반환합니다.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// 아티팩트 컬렉션을 가변으로 반환합니다.
    ///
    /// 요소 변경(마킹)만 가능하며 구조 변경은 [`add_artifact`](Self::add_artifact),
    /// [`remove_deleted`](Self::remove_deleted)를 사용합니다.
    pub fn artifacts_mut(&mut self) -> &mut [Artifact] {
        &mut self.artifacts
    }

    /// 파일 아티팩트만 순회합니다.
    pub fn files(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts
            .iter()
            .filter(|a| a.kind == ArtifactKind::File)
    }

    /// 아티팩트를 추가합니다.
    pub fn add_artifact(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    /// 여러 아티팩트를 추가합니다.
    pub fn extend_artifacts(&mut self, artifacts: impl IntoIterator<Item = Artifact>) {
        self.artifacts.extend(artifacts);
    }

    /// 선언된 에셋을 반환합니다.
    pub fn assets(&self) -> &[AssetRecord] {
        &self.assets
    }

    /// 에셋을 추가합니다. 같은 ID가 이미 있으면 속성을 병합합니다.
    pub fn add_asset(&mut self, asset: AssetRecord) {
        match self
            .assets
            .iter_mut()
            .find(|existing| existing.asset_id == asset.asset_id)
        {
            Some(existing) => existing.attributes.extend(asset.attributes),
            None => self.assets.push(asset),
        }
    }

    /// 삭제 지시자가 설정된 모든 아티팩트를 영구 제거합니다.
    ///
    /// 제거된 아티팩트 수를 반환합니다.
    pub fn remove_deleted(&mut self) -> usize {
        let before = self.artifacts.len();
        self.artifacts.retain(|a| !a.is_absorbed());
        let removed = before - self.artifacts.len();
        debug!(removed, remaining = self.artifacts.len(), "removed absorbed artifacts");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetMarker;

    fn sample_files() -> Vec<ScannedFile> {
        vec![
            ScannedFile::new("app/node_modules/foo/package.json", "H1"),
            ScannedFile::new("app/node_modules/foo/index.js", "H2"),
            ScannedFile::new("app/main.js", "H3"),
        ]
    }

    #[test]
    fn from_scanned_files_creates_file_artifacts() {
        let files = sample_files();
        let context = ScanContext::from_scanned_files("/scan", &files);
        assert_eq!(context.base_dir(), "/scan");
        assert_eq!(context.artifacts().len(), 3);
        assert_eq!(context.files().count(), 3);
    }

    #[test]
    fn files_excludes_components() {
        let files = sample_files();
        let mut context = ScanContext::from_scanned_files("/scan", &files);
        context.add_artifact(Artifact::new("foo-1.0.0", ArtifactKind::Component));
        assert_eq!(context.artifacts().len(), 4);
        assert_eq!(context.files().count(), 3);
    }

    #[test]
    fn remove_deleted_drops_absorbed_only() {
        let files = sample_files();
        let mut context = ScanContext::from_scanned_files("/scan", &files);
        let no_chain: Vec<String> = Vec::new();
        context.artifacts_mut()[0].absorb(&no_chain);
        context.artifacts_mut()[1].absorb(&no_chain);

        assert_eq!(context.remove_deleted(), 2);
        assert_eq!(context.artifacts().len(), 1);
        assert_eq!(context.artifacts()[0].id, "main.js");
    }

    #[test]
    fn add_asset_merges_attributes() {
        let mut context = ScanContext::new("/scan");
        let mut first = AssetRecord::new("AID-image");
        first.attributes.insert("type".to_owned(), "container".to_owned());
        context.add_asset(first);

        let mut second = AssetRecord::new("AID-image");
        second.attributes.insert("digest".to_owned(), "sha256:abc".to_owned());
        context.add_asset(second);

        assert_eq!(context.assets().len(), 1);
        assert_eq!(context.assets()[0].attributes.len(), 2);
    }

    #[test]
    fn asset_id_chain_is_kept() {
        let context =
            ScanContext::new("/scan").with_asset_id_chain(vec!["AID-image".to_owned()]);
        assert_eq!(context.asset_id_chain().to_vec(), vec!["AID-image".to_owned()]);

        let mut artifact = Artifact::new("x", ArtifactKind::File);
        artifact.absorb(context.asset_id_chain());
        assert_eq!(artifact.markers.get("AID-image"), Some(&AssetMarker::Contains));
    }
}
