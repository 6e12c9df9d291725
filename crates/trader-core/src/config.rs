//! 설정 관리.
//!
//! 설정 파일(TOML)과 `BACKTEST__` 접두사 환경 변수에서 로드합니다.
//! 예: `BACKTEST__BACKTEST__COMMISSION_RATE=0.0005`, `BACKTEST__LOGGING__FORMAT=json`

use crate::error::{TraderError, TraderResult};
use crate::logging::LogFormat;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 환경 변수 접두사.
const ENV_PREFIX: &str = "BACKTEST";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 백테스트 설정
    #[serde(default)]
    pub backtest: BacktestSettings,
    /// 데이터 설정
    #[serde(default)]
    pub data: DataSettings,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 백테스트 실행 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BacktestSettings {
    /// 수수료율 (체결 금액 대비)
    #[serde(default = "default_commission_rate")]
    pub commission_rate: Decimal,
    /// 무위험 수익률 (연율)
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// 비교 요청당 최대 전략 수
    #[serde(default = "default_max_strategies")]
    pub max_strategies: usize,
    /// 다중 전략 실행 시 전략별 병렬 실행 여부
    #[serde(default)]
    pub parallel_strategies: bool,
}

fn default_commission_rate() -> Decimal {
    dec!(0.0003)
}

fn default_risk_free_rate() -> f64 {
    0.03
}

fn default_max_strategies() -> usize {
    10
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            commission_rate: default_commission_rate(),
            risk_free_rate: default_risk_free_rate(),
            max_strategies: default_max_strategies(),
            parallel_strategies: false,
        }
    }
}

/// 가격 데이터 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataSettings {
    /// 합성 가격 생성기의 기본 시드
    #[serde(default = "default_synthetic_seed")]
    pub synthetic_seed: u64,
}

fn default_synthetic_seed() -> u64 {
    42
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            synthetic_seed: default_synthetic_seed(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨 필터 (예: "info", "trader_analytics=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 로그 형식
    #[serde(default)]
    pub format: LogFormat,
    /// 파일명과 줄 번호 포함 여부
    #[serde(default)]
    pub with_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            with_file: false,
        }
    }
}

impl LoggingConfig {
    /// 새 로깅 설정을 생성합니다.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// 로그 형식을 설정합니다.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> TraderResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(env_source());
        Self::build(builder)
    }

    /// 파일이 주어지면 파일과 환경 변수에서, 아니면 기본값과 환경 변수에서 로드합니다.
    pub fn load_or_default(path: Option<&Path>) -> TraderResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::build(config::Config::builder().add_source(env_source())),
        }
    }

    /// TOML 문자열에서 설정을 로드합니다 (환경 변수 오버라이드 없음).
    pub fn from_toml_str(content: &str) -> TraderResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml));
        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> TraderResult<Self> {
        let config: AppConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| TraderError::validation(format!("설정 로드 실패: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 설정 값의 범위를 검증합니다.
    pub fn validate(&self) -> TraderResult<()> {
        let b = &self.backtest;
        if b.commission_rate < Decimal::ZERO || b.commission_rate >= Decimal::ONE {
            return Err(TraderError::validation(format!(
                "commission_rate는 [0, 1) 범위여야 합니다: {}",
                b.commission_rate
            )));
        }
        if !b.risk_free_rate.is_finite() {
            return Err(TraderError::validation("risk_free_rate는 유한한 값이어야 합니다"));
        }
        if b.max_strategies == 0 {
            return Err(TraderError::validation("max_strategies는 1 이상이어야 합니다"));
        }
        Ok(())
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
