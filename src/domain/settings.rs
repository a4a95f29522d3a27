//! Validated runtime settings built from a [`ConfigPort`].
//!
//! Every key is optional; absent keys fall back to defaults. Present but
//! malformed values are rejected rather than silently replaced.

use chrono::NaiveDate;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::domain::aggregate::DEFAULT_MA_WINDOW;
use crate::domain::chart::{ChartSettings, MAX_CHART_DIMENSION};
use crate::domain::era::{Era, EraSet};
use crate::domain::error::ConfigError;
use crate::domain::ohlcv::PriceField;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:5000";

/// Inputs to the startup computation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub eras: EraSet,
    pub price_field: PriceField,
    pub ma_window: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            eras: EraSet::default(),
            price_field: PriceField::default(),
            ma_window: DEFAULT_MA_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub data_path: Option<PathBuf>,
    pub listen: SocketAddr,
    pub chart: ChartSettings,
    pub analysis: AnalysisSettings,
}

impl AppSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ConfigError> {
        let listen_str = config
            .get_string("web", "listen")
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen_str
            .trim()
            .parse()
            .map_err(|_| invalid("web", "listen", format!("not a socket address: {listen_str}")))?;

        let defaults = ChartSettings::default();
        let chart = ChartSettings {
            width: dimension(config, "width", defaults.width)?,
            height: dimension(config, "height", defaults.height)?,
            dpi: positive_u32(config, "charts", "dpi", defaults.dpi)?,
        };

        let price_field = match config.get_string("charts", "price_field") {
            Some(s) => s.parse().map_err(|e| invalid("charts", "price_field", e))?,
            None => PriceField::default(),
        };
        let ma_window =
            positive_u32(config, "charts", "ma_window", DEFAULT_MA_WINDOW as u32)? as usize;

        Ok(Self {
            data_path: config
                .get_string("data", "path")
                .map(|p| PathBuf::from(p.trim())),
            listen,
            chart,
            analysis: AnalysisSettings {
                eras: eras_from_config(config)?,
                price_field,
                ma_window,
            },
        })
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_path: None,
            listen: DEFAULT_LISTEN
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 5000))),
            chart: ChartSettings::default(),
            analysis: AnalysisSettings::default(),
        }
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn positive_u32(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: u32,
) -> Result<u32, ConfigError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(invalid(section, key, format!("must be a positive integer, got {raw}"))),
        },
    }
}

fn dimension(config: &dyn ConfigPort, key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = positive_u32(config, "charts", key, default)?;
    if value > MAX_CHART_DIMENSION {
        return Err(invalid(
            "charts",
            key,
            format!("must be at most {MAX_CHART_DIMENSION}, got {value}"),
        ));
    }
    Ok(value)
}

fn parse_bound(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, ConfigError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| invalid(section, key, format!("expected YYYY-MM-DD, got {raw}"))),
    }
}

/// Reads `[eras] order = a, b, c` and one `[era.<name>]` section per entry.
/// Without an `[eras]` order the three default eras apply.
fn eras_from_config(config: &dyn ConfigPort) -> Result<EraSet, ConfigError> {
    let Some(order) = config.get_string("eras", "order") else {
        return Ok(EraSet::default());
    };

    let names: Vec<&str> = order.split(',').map(str::trim).collect();
    if names.iter().any(|n| n.is_empty()) {
        return Err(invalid("eras", "order", "empty era name"));
    }

    let eras = names
        .iter()
        .map(|name| {
            let section = format!("era.{name}");
            let label = config
                .get_string(&section, "label")
                .map(|l| l.trim().to_string())
                .unwrap_or_else(|| name.to_string());
            let start = parse_bound(config, &section, "start")?;
            let end = parse_bound(config, &section, "end")?;
            if start.is_none() && end.is_none() {
                return Err(ConfigError::Missing {
                    section,
                    key: "start".to_string(),
                });
            }
            Ok(Era::new(label, start, end))
        })
        .collect::<Result<Vec<_>, _>>()?;

    EraSet::new(eras)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn settings(content: &str) -> Result<AppSettings, ConfigError> {
        let config = FileConfigAdapter::from_string(content).unwrap();
        AppSettings::from_config(&config)
    }

    #[test]
    fn empty_config_uses_defaults() {
        let s = settings("").unwrap();
        assert_eq!(s, AppSettings::default());
        assert_eq!(s.listen.port(), 5000);
        assert_eq!(s.analysis.eras.len(), 3);
        assert_eq!(s.analysis.ma_window, 3);
    }

    #[test]
    fn reads_all_sections() {
        let s = settings(
            r#"
[data]
path = data/ba.us.txt

[web]
listen = 0.0.0.0:8080

[charts]
width = 800
height = 400
dpi = 72
price_field = open
ma_window = 5
"#,
        )
        .unwrap();
        assert_eq!(s.data_path, Some(PathBuf::from("data/ba.us.txt")));
        assert_eq!(s.listen.port(), 8080);
        assert_eq!(
            s.chart,
            ChartSettings {
                width: 800,
                height: 400,
                dpi: 72
            }
        );
        assert_eq!(s.analysis.price_field, PriceField::Open);
        assert_eq!(s.analysis.ma_window, 5);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            settings("[web]\nlisten = nowhere\n"),
            Err(ConfigError::Invalid { key, .. }) if key == "listen"
        ));
        assert!(matches!(
            settings("[charts]\nma_window = 0\n"),
            Err(ConfigError::Invalid { key, .. }) if key == "ma_window"
        ));
        assert!(matches!(
            settings("[charts]\nprice_field = volume\n"),
            Err(ConfigError::Invalid { key, .. }) if key == "price_field"
        ));
    }

    #[test]
    fn rejects_oversized_chart_dimensions() {
        assert!(matches!(
            settings("[charts]\nwidth = 4294967295\nheight = 4294967295\n"),
            Err(ConfigError::Invalid { key, .. }) if key == "width"
        ));
        assert!(matches!(
            settings("[charts]\nheight = 100000\n"),
            Err(ConfigError::Invalid { key, .. }) if key == "height"
        ));
        let s = settings("[charts]\nwidth = 10000\nheight = 10000\n").unwrap();
        assert_eq!((s.chart.width, s.chart.height), (10_000, 10_000));
    }

    #[test]
    fn reads_custom_eras() {
        let s = settings(
            r#"
[eras]
order = early, late

[era.early]
label = Before 2000
end = 1999-12-31

[era.late]
start = 2000-01-01
"#,
        )
        .unwrap();
        let eras = s.analysis.eras.eras();
        assert_eq!(eras.len(), 2);
        assert_eq!(eras[0].label, "Before 2000");
        assert_eq!(eras[0].start, None);
        assert_eq!(eras[1].label, "late");
        assert_eq!(eras[1].end, None);
    }

    #[test]
    fn overlapping_custom_eras_are_rejected() {
        let err = settings(
            r#"
[eras]
order = a, b

[era.a]
start = 1970-01-01
end = 1995-12-31

[era.b]
start = 1990-01-01
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::OverlappingEras { .. }));
    }

    #[test]
    fn era_without_bounds_is_rejected() {
        let err = settings("[eras]\norder = a\n\n[era.a]\nlabel = A\n").unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }
}
