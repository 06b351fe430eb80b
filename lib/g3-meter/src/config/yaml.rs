/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use yaml_rust::{Yaml, yaml};

use g3_histogram::BucketBoundaries;

use super::ProviderConfig;
use crate::Temporality;

fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    let secs = match v {
        Yaml::String(s) => match humanize_rs::duration::parse(s) {
            Ok(d) => return Ok(d),
            // plain numbers are seconds
            Err(ParseError::MissingUnit) => {
                f64::from_str(s).map_err(|_| anyhow!("invalid duration string {s}"))?
            }
            Err(e) => return Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(i) => *i as f64,
        Yaml::Real(s) => f64::from_str(s).map_err(|e| anyhow!("invalid f64 value: {e}"))?,
        _ => {
            return Err(anyhow!(
                "yaml value type for duration should be 'string', 'integer' or 'real'"
            ));
        }
    };
    Duration::try_from_secs_f64(secs).map_err(anyhow::Error::new)
}

fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => usize::from_str(s).map_err(|e| anyhow!("invalid usize string: {e}")),
        Yaml::Integer(i) => usize::try_from(*i).map_err(|e| anyhow!("out of range usize: {e}")),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

fn as_f64(v: &Yaml) -> anyhow::Result<f64> {
    match v {
        Yaml::String(s) | Yaml::Real(s) => {
            f64::from_str(s).map_err(|e| anyhow!("invalid f64 value: {e}"))
        }
        Yaml::Integer(i) => Ok(*i as f64),
        _ => Err(anyhow!(
            "yaml value type for 'f64' should be 'string', 'integer' or 'real'"
        )),
    }
}

fn as_temporality(v: &Yaml) -> anyhow::Result<Temporality> {
    if let Yaml::String(s) = v {
        Temporality::from_str(s).map_err(|_| anyhow!("invalid temporality {s}"))
    } else {
        Err(anyhow!("yaml value type for temporality should be 'string'"))
    }
}

fn as_boundaries(v: &Yaml) -> anyhow::Result<BucketBoundaries> {
    let Yaml::Array(seq) = v else {
        return Err(anyhow!("yaml value type for boundaries should be 'array'"));
    };
    let mut bounds = Vec::with_capacity(seq.len());
    for (i, v) in seq.iter().enumerate() {
        let b = as_f64(v).context(format!("invalid value for boundary #{i}"))?;
        bounds.push(b);
    }
    BucketBoundaries::new(bounds).map_err(anyhow::Error::new)
}

impl ProviderConfig {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let mut config = ProviderConfig::default();
        match v {
            Yaml::Hash(map) => foreach_kv(map, |k, v| config.set_yaml(k, v))?,
            Yaml::Null => {}
            _ => return Err(anyhow!("yaml value type for provider config should be 'map'")),
        }
        Ok(config)
    }

    fn set_yaml(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match normalize_key(k).as_str() {
            "shard_count" => {
                let count = as_usize(v).context(format!("invalid usize value for key {k}"))?;
                self.set_shard_count(count);
                Ok(())
            }
            "temporality" => {
                self.temporality =
                    as_temporality(v).context(format!("invalid temporality value for key {k}"))?;
                Ok(())
            }
            "collect_timeout" => {
                let timeout = as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                self.set_collect_timeout(timeout);
                Ok(())
            }
            "flush_interval" => {
                let interval = as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                if interval.is_zero() {
                    return Err(anyhow!("flush interval should not be zero"));
                }
                self.set_flush_interval(interval);
                Ok(())
            }
            "histogram_boundaries" => {
                let bounds =
                    as_boundaries(v).context(format!("invalid boundaries value for key {k}"))?;
                self.set_histogram_boundaries(bounds);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml_rust::YamlLoader;

    fn load(s: &str) -> Yaml {
        YamlLoader::load_from_str(s).unwrap().remove(0)
    }

    #[test]
    fn full() {
        let doc = load(
            r#"
            shard-count: 10
            temporality: delta
            collect_timeout: 500ms
            Flush_Interval: 10
            histogram_boundaries: [1, 2.5, "10"]
            "#,
        );
        let config = ProviderConfig::parse_yaml(&doc).unwrap();
        assert_eq!(config.shard_count(), 16);
        assert_eq!(config.temporality(), Temporality::Delta);
        assert_eq!(config.collect_timeout(), Some(Duration::from_millis(500)));
        assert_eq!(config.flush_interval(), Some(Duration::from_secs(10)));
        assert_eq!(config.histogram_boundaries().as_slice(), &[1.0, 2.5, 10.0]);
    }

    #[test]
    fn empty() {
        let config = ProviderConfig::parse_yaml(&Yaml::Null).unwrap();
        assert_eq!(config, ProviderConfig::default());
    }

    #[test]
    fn invalid() {
        assert!(ProviderConfig::parse_yaml(&load("unknown: 1")).is_err());
        assert!(ProviderConfig::parse_yaml(&load("temporality: sometimes")).is_err());
        assert!(ProviderConfig::parse_yaml(&load("flush_interval: 0")).is_err());
        assert!(ProviderConfig::parse_yaml(&load("collect_timeout: -2")).is_err());
        assert!(ProviderConfig::parse_yaml(&load("shard_count: -1")).is_err());
        assert!(ProviderConfig::parse_yaml(&load("histogram_boundaries: [5, 1]")).is_err());
        assert!(ProviderConfig::parse_yaml(&load("- a")).is_err());
    }
}
