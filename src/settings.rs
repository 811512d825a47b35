use std::collections::{HashMap, HashSet};

use serde_json::Value;
use sqlx::PgPool;

use crate::db;

/// Per-request view over the settings table. Each value is fetched at most
/// once per instance; construct a fresh store for every request so operator
/// edits take effect on the next one.
pub struct SettingsStore {
    pool: PgPool,
    cache: HashMap<String, Option<Value>>,
    warned: HashSet<String>,
}

impl SettingsStore {
    pub fn new(pool: PgPool) -> Self {
        SettingsStore {
            pool,
            cache: HashMap::new(),
            warned: HashSet::new(),
        }
    }

    /// Raw JSON value for a key. A missing row, a JSON null and a failed read
    /// all come back as `None`; read failures are logged, never propagated.
    pub async fn raw(&mut self, key: &str) -> Option<Value> {
        if let Some(cached) = self.cache.get(key) {
            return cached.clone();
        }

        let value = match db::settings::get(&self.pool, key).await {
            Ok(row) => row.and_then(|s| s.value).filter(|v| !v.is_null()),
            Err(err) => {
                tracing::error!("settings read failed for {key}: {err}");
                None
            }
        };

        self.cache.insert(key.to_string(), value.clone());
        value
    }

    pub async fn get_bool(&mut self, key: &str, default: bool) -> bool {
        match self.raw(key).await {
            None => default,
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => true,
                "false" | "0" | "no" | "off" | "" => false,
                _ => {
                    self.warn_once(key, "unrecognized boolean value, using default");
                    default
                }
            },
            Some(Value::Number(n)) => match n.as_i64() {
                Some(0) => false,
                Some(_) => true,
                None => {
                    self.warn_once(key, "unrecognized boolean value, using default");
                    default
                }
            },
            Some(_) => {
                self.warn_once(key, "unrecognized boolean value, using default");
                default
            }
        }
    }

    pub async fn get_int(&mut self, key: &str, default: i64) -> i64 {
        let num = match self.raw(key).await {
            None => default,
            Some(Value::Number(n)) => match n.as_i64() {
                Some(i) => i,
                None => {
                    self.warn_once(key, "is not an integer, using default");
                    default
                }
            },
            Some(Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(i) => i,
                Err(_) => {
                    self.warn_once(key, "is not numeric, using default");
                    default
                }
            },
            Some(_) => {
                self.warn_once(key, "is not numeric, using default");
                default
            }
        };

        // Domain guards for sensitive keys.
        match key {
            "trial.duration_days" if !(7..=60).contains(&num) => {
                self.warn_once(key, "out of range, falling back to 14");
                14
            }
            // 0 disables the throttle entirely.
            "security.signup.throttle_per_ip" if num < 1 => 0,
            "security.signup.throttle_per_ip" if num > 50 => 50,
            _ => num,
        }
    }

    pub async fn get_string(&mut self, key: &str, default: &str) -> String {
        let val = match self.raw(key).await {
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Some(_) => {
                self.warn_once(key, "is not a string, using default");
                None
            }
            None => None,
        };

        match val {
            Some(v) => v,
            // Localization keys must always resolve to a usable value.
            None => match key {
                "defaults.language" => "pl".to_string(),
                "defaults.locale" => "pl_PL".to_string(),
                "defaults.timezone" => "Europe/Warsaw".to_string(),
                _ => default.to_string(),
            },
        }
    }

    /// String list. Non-string and empty entries are dropped; the onboarding
    /// field lists additionally only accept `user.`/`company.` namespaced
    /// entries.
    pub async fn get_array(&mut self, key: &str) -> Vec<String> {
        let items = match self.raw(key).await {
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.warn_once(key, "is not an array, using empty list");
                return Vec::new();
            }
            None => return Vec::new(),
        };

        let mut out: Vec<String> = items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect();

        if matches!(
            key,
            "onboarding.required_fields.user" | "onboarding.required_fields.company"
        ) {
            out.retain(|entry| entry.starts_with("user.") || entry.starts_with("company."));
        }

        out
    }

    fn warn_once(&mut self, key: &str, detail: &str) {
        if self.warned.insert(key.to_string()) {
            tracing::warn!("settings: {key} {detail}");
        }
    }
}
