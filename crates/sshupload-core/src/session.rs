// sshupload Session (russh 기반)
//
// Connector  : 설정으로 인증된 세션을 여는 주체
// SshSession : 인증된 연결. SFTP 채널을 열 수 있음
//
// 구현:
// - RusshConnector  : russh로 실제 연결/인증
// - PrebuiltSession : 호출자가 미리 만든 세션을 그대로 사용
// - memory 모듈     : 네트워크 없는 테스트용 구현

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use russh::client;

use crate::config::ConnectConfig;
use crate::error::{Error, Result};
use crate::sftp::{RusshSftpChannel, SftpChannel};
use crate::state::{ConnectionObserver, ConnectionState, StateTracker, TracingObserver};

#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &ConnectConfig) -> Result<Arc<dyn SshSession>>;
}

#[async_trait]
pub trait SshSession: Send + Sync {
    async fn open_sftp(&self) -> Result<Arc<dyn SftpChannel>>;
}

// ── PrebuiltSession ──────────────────────────────────────────────────────────

/// 미리 인증된 세션을 연결 단계 없이 넘겨주는 Connector
pub struct PrebuiltSession {
    session: Arc<dyn SshSession>,
}

impl PrebuiltSession {
    pub fn new(session: Arc<dyn SshSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Connector for PrebuiltSession {
    async fn connect(&self, config: &ConnectConfig) -> Result<Arc<dyn SshSession>> {
        tracing::debug!("[session] using pre-built session for {}", config.addr());
        Ok(self.session.clone())
    }
}

// ── russh ────────────────────────────────────────────────────────────────────

// russh 클라이언트 핸들러 (서버 이벤트 처리)
struct ClientHandler;

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &russh::keys::key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        // 호스트키 검증은 하지 않음 (known_hosts 미지원)
        tracing::debug!("[session] server key {}", server_public_key.fingerprint());
        Ok(true)
    }
}

pub struct RusshConnector {
    config: Arc<client::Config>,
    observer: Arc<dyn ConnectionObserver>,
}

impl RusshConnector {
    pub fn new(observer: Arc<dyn ConnectionObserver>) -> Self {
        Self { config: Arc::new(client::Config::default()), observer }
    }
}

impl Default for RusshConnector {
    fn default() -> Self {
        Self::new(Arc::new(TracingObserver))
    }
}

#[async_trait]
impl Connector for RusshConnector {
    async fn connect(&self, config: &ConnectConfig) -> Result<Arc<dyn SshSession>> {
        let mut state = StateTracker::new(self.observer.clone());

        // ---- TCP 연결 + 키 교환 ----
        state.transition(ConnectionState::TcpConnecting)?;

        let addr = config.addr();
        tracing::info!("[session] connecting to {}", addr);

        let mut ssh = client::connect(self.config.clone(), addr, ClientHandler)
            .await
            .map_err(|e| {
                state.fail(e.to_string());
                Error::Protocol(e.to_string())
            })?;

        // ---- 인증 ----
        state.transition(ConnectionState::Authenticating)?;

        let authed = authenticate(&mut ssh, config).await.map_err(|e| {
            state.fail(e.to_string());
            e
        })?;

        if !authed {
            state.fail("Authentication failed");
            return Err(Error::Auth("Authentication failed".to_string()));
        }
        state.transition(ConnectionState::Authenticated)?;
        tracing::info!("[session] authenticated as {}", config.username);

        Ok(Arc::new(RusshSession { handle: ssh, state: Mutex::new(state) }))
    }
}

/// 인증 시도 순서: private key → agent → password
///
/// 먼저 수락된 방식에서 멈춤. 아무것도 없으면 "none" 인증
async fn authenticate(ssh: &mut client::Handle<ClientHandler>, config: &ConnectConfig) -> Result<bool> {
    let user  = config.username.as_str();
    let creds = &config.credentials;

    if creds.is_empty() {
        return ssh.authenticate_none(user)
            .await
            .map_err(|e| Error::Auth(e.to_string()));
    }

    if let Some(pem) = &creds.private_key {
        let text = std::str::from_utf8(pem)
            .map_err(|_| Error::Auth("private key is not valid UTF-8".to_string()))?;
        let key = russh::keys::decode_secret_key(text, None)
            .map_err(|e| Error::Auth(e.to_string()))?;
        if ssh.authenticate_publickey(user, Arc::new(key))
            .await
            .map_err(|e| Error::Auth(e.to_string()))?
        {
            tracing::debug!("[session] private key accepted");
            return Ok(true);
        }
    }

    if let Some(socket) = &creds.agent {
        if authenticate_agent(ssh, user, socket).await? {
            tracing::debug!("[session] agent key accepted");
            return Ok(true);
        }
    }

    if let Some(password) = &creds.password {
        return ssh.authenticate_password(user, password)
            .await
            .map_err(|e| Error::Auth(e.to_string()));
    }

    Ok(false)
}

#[cfg(unix)]
async fn authenticate_agent(
    ssh: &mut client::Handle<ClientHandler>,
    user: &str,
    socket: &Path,
) -> Result<bool> {
    use russh::keys::agent::client::AgentClient;

    let mut agent = AgentClient::connect_uds(socket)
        .await
        .map_err(|e| Error::Auth(format!("agent {}: {}", socket.display(), e)))?;
    let identities = agent.request_identities()
        .await
        .map_err(|e| Error::Auth(e.to_string()))?;

    // 서명 요청마다 agent 소유권이 넘어갔다 돌아옴
    for key in identities {
        let (returned, result) = ssh.authenticate_future(user, key, agent).await;
        agent = returned;
        if result.map_err(|e| Error::Auth(e.to_string()))? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(not(unix))]
async fn authenticate_agent(
    _ssh: &mut client::Handle<ClientHandler>,
    _user: &str,
    socket: &Path,
) -> Result<bool> {
    Err(Error::Auth(format!("agent socket {} is only supported on unix", socket.display())))
}

pub struct RusshSession {
    handle: client::Handle<ClientHandler>,
    state: Mutex<StateTracker>,
}

impl RusshSession {
    fn transition(&self, next: ConnectionState) -> Result<()> {
        self.state
            .lock()
            .map_err(|_| Error::Protocol("connection state lock poisoned".to_string()))?
            .transition(next)
    }

    fn fail(&self, message: String) {
        if let Ok(mut state) = self.state.lock() {
            state.fail(message);
        }
    }
}

#[async_trait]
impl SshSession for RusshSession {
    async fn open_sftp(&self) -> Result<Arc<dyn SftpChannel>> {
        // ---- 채널 + SFTP ----
        self.transition(ConnectionState::ChannelOpening)?;

        let channel = self.handle.channel_open_session()
            .await
            .map_err(|e| {
                self.fail(e.to_string());
                Error::Protocol(e.to_string())
            })?;

        channel.request_subsystem(true, "sftp")
            .await
            .map_err(|e| {
                self.fail(e.to_string());
                Error::Protocol(e.to_string())
            })?;

        let sftp = russh_sftp::client::SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| {
                self.fail(e.to_string());
                Error::Sftp(e.to_string())
            })?;

        self.transition(ConnectionState::SftpReady)?;

        tracing::info!("[session] SFTP ready");
        Ok(Arc::new(RusshSftpChannel::new(sftp)))
    }
}

// handle이 drop되면 연결이 닫힘 → 상태만 기록
impl Drop for RusshSession {
    fn drop(&mut self) {
        if let Ok(state) = self.state.get_mut() {
            tracing::debug!("[session] closing from {:?}", state.state());
            let _ = state.transition(ConnectionState::Disconnecting);
            let _ = state.transition(ConnectionState::Disconnected);
        }
    }
}
