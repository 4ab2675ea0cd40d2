// sshupload Connection State Machine + Observer
//
// 업로드 1회 동안의 SSH 연결 라이프사이클
// can_transition_to()로 허용된 전이만 가능하게 강제
//
// 상태 흐름:
//   Idle → TcpConnecting → Authenticating → Authenticated
//     → ChannelOpening → SftpReady → Disconnecting → Disconnected
//
//   어느 상태에서든 → Disconnecting, Error 전이 가능

use std::sync::Arc;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Idle,
    TcpConnecting,
    Authenticating,
    Authenticated,
    ChannelOpening,
    SftpReady,
    Disconnecting,
    Disconnected,
    Error {
        state: Box<ConnectionState>,  // 에러 발생 시점의 상태
        message: String,
    },
}

impl ConnectionState {
    /// 허용된 다음 상태인지 검증
    pub fn can_transition_to(&self, next: &ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Idle, TcpConnecting)
            | (TcpConnecting, Authenticating)
            | (Authenticating, Authenticated)
            | (Authenticated, ChannelOpening)
            | (ChannelOpening, SftpReady)
            | (_, Disconnecting)
            | (Disconnecting, Disconnected)
            | (_, Error { .. })
        )
    }
}

/// 상태 변경 알림 trait
///
/// CLI: tracing debug 로그
/// 테스트: 전이 기록
pub trait ConnectionObserver: Send + Sync {
    fn on_state_changed(&self, prev: &ConnectionState, next: &ConnectionState);
}

/// 기본 observer: 전이를 debug 레벨로 남김
pub struct TracingObserver;

impl ConnectionObserver for TracingObserver {
    fn on_state_changed(&self, _prev: &ConnectionState, next: &ConnectionState) {
        tracing::debug!("[state] → {:?}", next);
    }
}

/// 현재 상태 + observer 통지를 묶은 추적기
pub struct StateTracker {
    state: ConnectionState,
    observer: Arc<dyn ConnectionObserver>,
}

impl StateTracker {
    pub fn new(observer: Arc<dyn ConnectionObserver>) -> Self {
        Self { state: ConnectionState::Idle, observer }
    }

    pub fn state(&self) -> &ConnectionState { &self.state }

    pub fn transition(&mut self, next: ConnectionState) -> Result<()> {
        if !self.state.can_transition_to(&next) {
            return Err(Error::InvalidTransition { from: self.state.clone(), to: next });
        }
        let prev = std::mem::replace(&mut self.state, next);
        self.observer.on_state_changed(&prev, &self.state);
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let current = self.state.clone();
        let prev = std::mem::replace(
            &mut self.state,
            ConnectionState::Error { state: Box::new(current), message: message.into() }
        );
        self.observer.on_state_changed(&prev, &self.state);
    }
}
