//! Fixed set of request profiles a simulated thread can run.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::models::{Phase, RequestProfile};

pub const LOW_IO: &str = "low-io";
pub const HEAVY_IO: &str = "heavy-io";

#[derive(Clone, Debug)]
pub struct Catalog {
    profiles: Vec<RequestProfile>,
}

impl Catalog {
    pub fn new(profiles: Vec<RequestProfile>) -> Result<Self> {
        let mut keys = HashSet::new();
        for profile in &profiles {
            if profile.key.trim().is_empty() {
                return Err(invalid(profile, "key must not be empty"));
            }
            if !keys.insert(profile.key.as_str()) {
                return Err(invalid(profile, "duplicate key"));
            }
            if profile.phases.is_empty() {
                return Err(invalid(profile, "profile has no phases"));
            }
            if let Some(idx) = profile.phases.iter().position(|phase| phase.duration == 0) {
                return Err(invalid(
                    profile,
                    &format!("phase {} duration must be > 0", idx),
                ));
            }
        }
        Ok(Self { profiles })
    }

    /// The process-wide built-in catalog.
    pub fn builtin() -> &'static Catalog {
        static BUILTIN: OnceLock<Catalog> = OnceLock::new();
        BUILTIN.get_or_init(|| Catalog {
            profiles: builtin_profiles(),
        })
    }

    pub fn lookup(&self, key: &str) -> Result<&RequestProfile> {
        self.get(key).ok_or_else(|| Error::UnknownProfile {
            unknown: vec![key.to_string()],
            valid: self.keys(),
        })
    }

    pub fn get(&self, key: &str) -> Option<&RequestProfile> {
        self.profiles.iter().find(|profile| profile.key == key)
    }

    /// Resolves every key, reporting all unknown keys at once.
    pub fn resolve<S: AsRef<str>>(&self, keys: &[S]) -> Result<Vec<&RequestProfile>> {
        let mut resolved = Vec::with_capacity(keys.len());
        let mut unknown: Vec<String> = Vec::new();
        for key in keys {
            let key = key.as_ref();
            match self.get(key) {
                Some(profile) => resolved.push(profile),
                None => {
                    if !unknown.iter().any(|seen| seen == key) {
                        unknown.push(key.to_string());
                    }
                }
            }
        }

        if !unknown.is_empty() {
            return Err(Error::UnknownProfile {
                unknown,
                valid: self.keys(),
            });
        }
        Ok(resolved)
    }

    pub fn keys(&self) -> Vec<String> {
        self.profiles.iter().map(|profile| profile.key.clone()).collect()
    }

    pub fn profiles(&self) -> &[RequestProfile] {
        &self.profiles
    }
}

fn builtin_profiles() -> Vec<RequestProfile> {
    vec![
        RequestProfile::new(
            LOW_IO,
            "Low IO",
            "short CPU bursts interleaved with short IO waits",
            vec![
                Phase::cpu(20),
                Phase::io(10),
                Phase::cpu(20),
                Phase::io(10),
                Phase::cpu(20),
                Phase::io(10),
                Phase::cpu(30),
            ],
        ),
        RequestProfile::new(
            HEAVY_IO,
            "Heavy IO",
            "short CPU setup, one long IO wait, short CPU teardown",
            vec![Phase::cpu(10), Phase::io(500), Phase::cpu(50)],
        ),
    ]
}

fn invalid(profile: &RequestProfile, reason: &str) -> Error {
    Error::InvalidProfile {
        key: profile.key.clone(),
        reason: reason.to_string(),
    }
}
