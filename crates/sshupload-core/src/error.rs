// sshupload Error Types
//
// 연결 단계(Auth/Protocol/Sftp)와 파일 단위(Transfer) 에러를 하나의 enum으로
// From<io::Error>: ? 연산자로 IO 에러 자동 변환

use crate::state::ConnectionState;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid state transition: {from:?} → {to:?}")]
    InvalidTransition {
        from: ConnectionState,
        to: ConnectionState,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Auth failed: {0}")]
    Auth(String),

    #[error("SFTP error: {0}")]
    Sftp(String),

    /// 필수 설정 누락 (네트워크 접근 전에 검출)
    #[error("missing required config: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("invalid file pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    #[error("config error: {0}")]
    Config(String),

    /// 파일 하나의 읽기/쓰기 실패. target으로 어떤 파일인지 식별
    #[error("upload of `{target}` failed: {source}")]
    Transfer {
        target: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn transfer(target: impl Into<String>, source: Error) -> Self {
        Error::Transfer { target: target.into(), source: Box::new(source) }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
