// sshupload In-memory session
//
// 네트워크 없이 Connector / SshSession / SftpChannel 을 모두 구현
// - 쓰여진 파일은 BTreeMap에 보관 (shutdown 시점에 확정)
// - 연결 실패, 경로별 쓰기 실패를 주입 가능
//
// 테스트 더블 + CLI --dry-run 에서 사용

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::config::ConnectConfig;
use crate::error::{Error, Result};
use crate::session::{Connector, SshSession};
use crate::sftp::{RemoteWriter, SftpChannel};

#[derive(Debug, Clone)]
enum ConnectFailure {
    Refused(String),
    AuthRejected(String),
}

#[derive(Default)]
struct RemoteState {
    files: BTreeMap<String, Vec<u8>>,
    opened: Vec<String>,
    connects: usize,
    connect_failure: Option<ConnectFailure>,
    write_failures: HashMap<String, String>,
}

/// 메모리 원격 호스트. clone은 같은 상태를 공유
#[derive(Clone, Default)]
pub struct MemorySession {
    state: Arc<Mutex<RemoteState>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// connect()가 연결 거부로 실패하도록
    pub fn refuse_connection(self, message: impl Into<String>) -> Self {
        self.lock().connect_failure = Some(ConnectFailure::Refused(message.into()));
        self
    }

    /// connect()가 인증 실패로 끝나도록
    pub fn reject_auth(self, message: impl Into<String>) -> Self {
        self.lock().connect_failure = Some(ConnectFailure::AuthRejected(message.into()));
        self
    }

    /// path로 열린 쓰기 스트림이 에러를 내도록
    pub fn fail_write(self, path: impl Into<String>, message: impl Into<String>) -> Self {
        self.lock().write_failures.insert(path.into(), message.into());
        self
    }

    /// 쓰기가 끝난(shutdown 된) 파일
    pub fn files(&self) -> BTreeMap<String, Vec<u8>> {
        self.lock().files.clone()
    }

    /// create()가 호출된 경로 (호출 순서)
    pub fn opened(&self) -> Vec<String> {
        self.lock().opened.clone()
    }

    pub fn connects(&self) -> usize {
        self.lock().connects
    }

    fn lock(&self) -> MutexGuard<'_, RemoteState> {
        // 테스트 패닉으로 poison 되어도 기록은 계속 읽을 수 있게
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Connector for MemorySession {
    async fn connect(&self, config: &ConnectConfig) -> Result<Arc<dyn SshSession>> {
        let failure = {
            let mut state = self.lock();
            state.connects += 1;
            state.connect_failure.clone()
        };

        match failure {
            Some(ConnectFailure::Refused(msg)) => Err(Error::Protocol(format!("{}: {}", config.addr(), msg))),
            Some(ConnectFailure::AuthRejected(msg)) => Err(Error::Auth(msg)),
            None => Ok(Arc::new(self.clone())),
        }
    }
}

#[async_trait]
impl SshSession for MemorySession {
    async fn open_sftp(&self) -> Result<Arc<dyn SftpChannel>> {
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl SftpChannel for MemorySession {
    async fn create(&self, path: &str) -> Result<RemoteWriter> {
        let fail = {
            let mut state = self.lock();
            state.opened.push(path.to_string());
            state.write_failures.get(path).cloned()
        };

        Ok(Box::pin(MemoryWriter {
            path: path.to_string(),
            buf: Vec::new(),
            remote: self.clone(),
            fail,
        }))
    }
}

struct MemoryWriter {
    path: String,
    buf: Vec<u8>,
    remote: MemorySession,
    fail: Option<String>,
}

impl MemoryWriter {
    fn injected_error(&self) -> Option<io::Error> {
        self.fail.as_ref().map(|msg| io::Error::new(io::ErrorKind::Other, msg.clone()))
    }
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, data: &[u8]) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if let Some(err) = this.injected_error() {
            return Poll::Ready(Err(err));
        }
        this.buf.extend_from_slice(data);
        Poll::Ready(Ok(data.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if let Some(err) = this.injected_error() {
            return Poll::Ready(Err(err));
        }
        let data = std::mem::take(&mut this.buf);
        this.remote.lock().files.insert(this.path.clone(), data);
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use tokio::io::AsyncWriteExt;

    fn config() -> ConnectConfig {
        ConnectConfig {
            host: "aaaa".into(),
            port: 22,
            username: "bbbb".into(),
            credentials: Credentials::default(),
        }
    }

    #[tokio::test]
    async fn file_is_stored_on_shutdown() {
        let remote  = MemorySession::new();
        let session = remote.connect(&config()).await.unwrap();
        let sftp    = session.open_sftp().await.unwrap();

        let mut w = sftp.create("aaaa/sw.js").await.unwrap();
        w.write_all(b"self.addEventListener").await.unwrap();
        assert!(remote.files().is_empty());

        w.shutdown().await.unwrap();
        assert_eq!(remote.files()["aaaa/sw.js"], b"self.addEventListener");
        assert_eq!(remote.opened(), vec!["aaaa/sw.js"]);
    }

    #[tokio::test]
    async fn injected_write_failure() {
        let remote = MemorySession::new().fail_write("aaaa/sw.js", "permission denied");
        let mut w  = remote.create("aaaa/sw.js").await.unwrap();

        let err = w.write_all(b"x").await.unwrap_err();
        assert_eq!(err.to_string(), "permission denied");
        assert!(remote.files().is_empty());
    }

    #[tokio::test]
    async fn injected_connect_failures() {
        let refused = MemorySession::new().refuse_connection("connection refused");
        let err = refused.connect(&config()).await.err().unwrap();
        assert!(matches!(err, Error::Protocol(ref m) if m == "aaaa:22: connection refused"));
        assert_eq!(refused.connects(), 1);

        let rejected = MemorySession::new().reject_auth("bad password");
        let err = rejected.connect(&config()).await.err().unwrap();
        assert!(matches!(err, Error::Auth(_)));
    }
}
