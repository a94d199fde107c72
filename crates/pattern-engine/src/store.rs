//! 패턴 저장소 -- 수락된 디스크립터와 이미 본 qualifier 집합

use std::collections::HashSet;

use crate::descriptor::{ComponentPatternDescriptor, DescriptorMode};

/// 패턴 저장소
///
/// 디스크립터를 삽입 순서대로 보관합니다. 같은 저장소를 공유하는
/// 여러 추출 패스에 걸쳐 qualifier 단위로 중복을 제거합니다.
#[derive(Debug, Default)]
pub struct PatternStore {
    descriptors: Vec<ComponentPatternDescriptor>,
    seen: HashSet<String>,
}

impl PatternStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 디스크립터를 추가합니다.
    ///
    /// 같은 qualifier가 이미 있으면 추가하지 않고 `false`를 반환합니다.
    pub fn insert(&mut self, descriptor: ComponentPatternDescriptor) -> bool {
        if !self.seen.insert(descriptor.qualifier()) {
            return false;
        }
        self.descriptors.push(descriptor);
        true
    }

    /// qualifier가 이미 등록되었는지 확인합니다.
    pub fn contains(&self, qualifier: &str) -> bool {
        self.seen.contains(qualifier)
    }

    /// 모든 디스크립터를 삽입 순서대로 반환합니다.
    pub fn descriptors(&self) -> &[ComponentPatternDescriptor] {
        &self.descriptors
    }

    /// 주어진 모드의 디스크립터만 순회합니다.
    pub fn iter_mode(
        &self,
        mode: DescriptorMode,
    ) -> impl Iterator<Item = &ComponentPatternDescriptor> {
        self.descriptors.iter().filter(move |d| d.mode == mode)
    }

    /// 디스크립터 수
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
