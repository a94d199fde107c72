//! 에러 타입 -- 도메인별 에러 정의

/// compscan 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum CompscanError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 컴포넌트 패턴 매칭 에러
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// 인벤토리 입력 파싱 에러
    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 컴포넌트 패턴 매칭 에러
///
/// 패턴 엔진의 상세 에러가 이 분류로 변환되어 상위로 전파됩니다.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// 디스크립터 설정 오류 (치명적, 패스 전체 중단)
    #[error("descriptor configuration error: {0}")]
    Descriptor(String),

    /// 컨트리뷰터 규칙 로딩 실패
    #[error("contributor rule error: {0}")]
    Rule(String),

    /// 엔진 내부 처리 실패
    #[error("engine failure: {0}")]
    Engine(String),
}

/// 인벤토리 입력 에러
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// 지원하지 않는 형식
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// 파싱 실패
    #[error("parse failed: {source_name}: {reason}")]
    Failed { source_name: String, reason: String },

    /// 입력 데이터 초과
    #[error("inventory too large: {size} files (max: {max})")]
    TooLarge { size: usize, max: usize },
}
