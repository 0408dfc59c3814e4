//! 분석 엔진 로깅.
//!
//! 엔진은 `tracing` 이벤트와 span만 발생시키며, 구독자는 호출자가
//! 프로세스당 한 번 `init_logging`으로 설치합니다.
//!
//! 레벨과 형식은 설정 파일의 `[logging]` 섹션에서 오며, 환경 변수
//! `ADVISOR__LOGGING__LEVEL`, `ADVISOR__LOGGING__FORMAT`으로 덮어쓸 수 있습니다.

use std::fmt as std_fmt;
use std::str::FromStr;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::error::{AdvisorError, AdvisorResult};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 여러 줄, 색상 포함 (개발용)
    #[default]
    Pretty,
    /// 한 줄 JSON (로그 수집용)
    Json,
    /// 한 줄 텍스트
    Compact,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

impl std_fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [LogFormat::Pretty, LogFormat::Json, LogFormat::Compact]
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AdvisorError::Config(format!("알 수 없는 로그 형식: {}", s)))
    }
}

/// 구독자 설치 옵션.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// `EnvFilter` 지시문 (예: "info,advisor_analytics=debug")
    pub level: String,
    pub format: LogFormat,
    /// span 생성/종료 이벤트 기록. 단계별 소요 시간 확인용.
    pub with_span_events: bool,
    pub with_file: bool,
    /// 일괄 분석에서 작업 스레드 구분용
    pub with_thread_ids: bool,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new("info")
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            with_span_events: false,
            with_file: false,
            with_thread_ids: false,
            with_target: true,
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.with_span_events = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    /// 레벨 지시문을 필터로 변환합니다.
    pub fn filter(&self) -> AdvisorResult<EnvFilter> {
        EnvFilter::try_new(&self.level).map_err(|e| {
            AdvisorError::Config(format!("잘못된 로그 레벨 '{}': {}", self.level, e))
        })
    }

    fn span_events(&self) -> FmtSpan {
        if self.with_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// 전역 구독자를 설치합니다.
///
/// 이미 설치되어 있거나 레벨 지시문이 잘못되면 `AdvisorError::Config`.
///
/// ```no_run
/// use advisor_core::logging::{init_logging, LogConfig, LogFormat};
///
/// let config = LogConfig::new("info,advisor_analytics=debug").with_format(LogFormat::Json);
/// init_logging(&config)?;
/// # Ok::<(), advisor_core::AdvisorError>(())
/// ```
pub fn init_logging(config: &LogConfig) -> AdvisorResult<()> {
    let layer = fmt::layer()
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .with_thread_ids(config.with_thread_ids)
        .with_target(config.with_target)
        .with_span_events(config.span_events());

    let registry = tracing_subscriber::registry().with(config.filter()?);
    let installed = match config.format {
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
    };
    installed.map_err(|e| AdvisorError::Config(format!("로깅 구독자 설치 실패: {}", e)))?;

    tracing::debug!(format = %config.format, level = %config.level, "로깅 초기화");
    Ok(())
}

/// 분석 컨텍스트(종목, 예측 기간) 필드를 가진 info span.
#[macro_export]
macro_rules! analysis_span {
    ($name:expr, $symbol:expr) => {
        tracing::info_span!($name, symbol = %$symbol)
    };
    ($name:expr, $symbol:expr, $horizon:expr) => {
        tracing::info_span!($name, symbol = %$symbol, horizon = %$horizon)
    };
}
