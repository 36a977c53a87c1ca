//! Sweep and detector settings.

use std::collections::BTreeMap;

use almanac_core::{
    ALL_ASPECTS, ASPECT_BODIES, AspectKind, BRIGHTNESS_BODIES, Body, INGRESS_BODIES,
    INNER_PLANETS, STATION_BODIES,
};
use serde::{Deserialize, Serialize};

/// Default number of samples on each side of the current minute used by the
/// station and extremum detectors.
pub const DEFAULT_MARGIN_MINUTES: usize = 3;
/// Default orb for multi-body patterns.
pub const DEFAULT_PATTERN_ORB_DEG: f64 = 3.0;
/// Largest margin accepted; windows are rebuilt per minute.
pub const MAX_MARGIN_MINUTES: usize = 720;

/// Minute-sweep settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepSettings {
    /// Samples before and after the current minute for station/extremum windows.
    pub margin_minutes: usize,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            margin_minutes: DEFAULT_MARGIN_MINUTES,
        }
    }
}

/// Which detector families run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorToggles {
    pub twilight: bool,
    pub ingress: bool,
    pub stations: bool,
    pub elongation: bool,
    pub brightness: bool,
    pub visibility: bool,
    pub aspects: bool,
    /// Multi-body patterns are combinatorial in the body count; off by default.
    pub patterns: bool,
}

impl Default for DetectorToggles {
    fn default() -> Self {
        Self {
            twilight: true,
            ingress: true,
            stations: true,
            elongation: true,
            brightness: true,
            visibility: true,
            aspects: true,
            patterns: false,
        }
    }
}

/// Body subsets per detector family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BodySelection {
    pub ingress: Vec<Body>,
    pub stations: Vec<Body>,
    pub aspects: Vec<Body>,
    pub patterns: Vec<Body>,
    pub brightness: Vec<Body>,
    /// Inner planets followed through elongation and visibility phases.
    pub visibility: Vec<Body>,
}

impl Default for BodySelection {
    fn default() -> Self {
        Self {
            ingress: INGRESS_BODIES.to_vec(),
            stations: STATION_BODIES.to_vec(),
            aspects: ASPECT_BODIES.to_vec(),
            patterns: ASPECT_BODIES.to_vec(),
            brightness: BRIGHTNESS_BODIES.to_vec(),
            visibility: INNER_PLANETS.to_vec(),
        }
    }
}

/// Aspect detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AspectSettings {
    /// Aspect kinds tested between every pair of aspect bodies.
    pub kinds: Vec<AspectKind>,
    /// Orb applied to every pairwise condition of a multi-body pattern.
    pub pattern_orb_deg: f64,
    /// Orb overrides; kinds not listed use [`AspectKind::default_orb_deg`].
    pub orbs: BTreeMap<AspectKind, f64>,
}

impl Default for AspectSettings {
    fn default() -> Self {
        Self {
            kinds: ALL_ASPECTS.to_vec(),
            pattern_orb_deg: DEFAULT_PATTERN_ORB_DEG,
            orbs: BTreeMap::new(),
        }
    }
}

impl AspectSettings {
    /// Effective orb for `kind`.
    pub fn orb_for(&self, kind: AspectKind) -> f64 {
        self.orbs
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_orb_deg())
    }
}

/// Elongation thresholds beyond which an inner planet is visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisibilitySettings {
    /// Threshold for bodies without an entry.
    pub fallback_deg: f64,
    pub thresholds_deg: BTreeMap<Body, f64>,
}

impl Default for VisibilitySettings {
    fn default() -> Self {
        let mut thresholds_deg = BTreeMap::new();
        thresholds_deg.insert(Body::Mercury, 10.0);
        thresholds_deg.insert(Body::Venus, 5.0);
        Self {
            fallback_deg: 10.0,
            thresholds_deg,
        }
    }
}

impl VisibilitySettings {
    pub fn threshold_for(&self, body: Body) -> f64 {
        self.thresholds_deg
            .get(&body)
            .copied()
            .unwrap_or(self.fallback_deg)
    }
}

pub(crate) fn validate_sweep(s: &SweepSettings) -> Result<(), &'static str> {
    if s.margin_minutes == 0 {
        return Err("sweep.margin_minutes must be > 0");
    }
    if s.margin_minutes > MAX_MARGIN_MINUTES {
        return Err("sweep.margin_minutes must be <= 720");
    }
    Ok(())
}

pub(crate) fn validate_aspects(a: &AspectSettings) -> Result<(), &'static str> {
    for orb in a.orbs.values() {
        if !orb.is_finite() || *orb <= 0.0 || *orb >= 90.0 {
            return Err("aspects.orbs values must be within (0, 90)");
        }
    }
    if !a.pattern_orb_deg.is_finite() || a.pattern_orb_deg <= 0.0 || a.pattern_orb_deg >= 30.0 {
        return Err("aspects.pattern_orb_deg must be within (0, 30)");
    }
    Ok(())
}

pub(crate) fn validate_visibility(v: &VisibilitySettings) -> Result<(), &'static str> {
    let all_ok = v
        .thresholds_deg
        .values()
        .chain(std::iter::once(&v.fallback_deg))
        .all(|t| t.is_finite() && *t > 0.0 && *t < 180.0);
    if all_ok {
        Ok(())
    } else {
        Err("visibility thresholds must be within (0, 180)")
    }
}
