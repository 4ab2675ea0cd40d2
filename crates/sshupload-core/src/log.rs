// sshupload Deploy Log
//
// 업로드/배포 단계가 사용자에게 보여줄 메시지 출력 수단
// 전역 로거에 직접 접근하지 않고 생성자로 주입받음
//
// CLI  : TracingLog (tracing info!/error!)
// 테스트: MemoryLog (메시지 기록)

use std::sync::Mutex;

pub trait DeployLog: Send + Sync {
    /// 진행 상황 (파일별 ✔ 표시, 요약 등)
    fn verbose(&self, message: &str);

    /// 실패 메시지
    fn error(&self, message: &str);
}

pub struct TracingLog;

impl DeployLog for TracingLog {
    fn verbose(&self, message: &str) {
        tracing::info!("- {}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("- {}", message);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogLine {
    Verbose(String),
    Error(String),
}

impl LogLine {
    pub fn text(&self) -> &str {
        match self {
            LogLine::Verbose(s) | LogLine::Error(s) => s,
        }
    }
}

/// 메시지를 순서대로 메모리에 쌓아두는 로그
#[derive(Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<LogLine>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.lines().iter().map(|l| l.text().to_string()).collect()
    }

    fn push(&self, line: LogLine) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl DeployLog for MemoryLog {
    fn verbose(&self, message: &str) {
        self.push(LogLine::Verbose(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(LogLine::Error(message.to_string()));
    }
}
