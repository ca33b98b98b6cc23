use std::str::FromStr;

use log::warn;

/// Node records each scene BVH buffer is allocated for.
pub const DEFAULT_NODE_CAPACITY: usize = 200;
pub const DEFAULT_SPHERE_COUNT: usize = 40;

pub const NODE_CAPACITY_VAR: &str = "BVH_NODE_CAPACITY";
pub const SPHERE_COUNT_VAR: &str = "BVH_SPHERE_COUNT";
pub const SEED_VAR: &str = "BVH_SEED";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub node_capacity: usize,
    pub sphere_count: usize,
    /// Fixed seed for the generated scene; random when unset.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            node_capacity: DEFAULT_NODE_CAPACITY,
            sphere_count: DEFAULT_SPHERE_COUNT,
            seed: None,
        }
    }
}

impl Settings {
    /// Defaults overridden by any of the `BVH_*` environment variables that are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            node_capacity: parse_or(
                NODE_CAPACITY_VAR,
                lookup(NODE_CAPACITY_VAR),
                defaults.node_capacity,
            ),
            sphere_count: parse_or(
                SPHERE_COUNT_VAR,
                lookup(SPHERE_COUNT_VAR),
                defaults.sphere_count,
            ),
            seed: lookup(SEED_VAR).and_then(|value| match value.trim().parse() {
                Ok(seed) => Some(seed),
                Err(_) => {
                    warn!("Ignoring {SEED_VAR}={value:?}: not a valid seed");
                    None
                }
            }),
        }
    }
}

fn parse_or<T: FromStr + std::fmt::Debug>(name: &str, value: Option<String>, default: T) -> T {
    let Some(value) = value else {
        return default;
    };

    match value.trim().parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!("Ignoring {name}={value:?}, keeping {default:?}");
            default
        }
    }
}
