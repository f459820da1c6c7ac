//! Cohesive contact parameters.
//!
//! Nine run-wide constants control the model: the linear spring and damping
//! coefficients of ordinary granular contact, Coulomb friction, and the
//! three bond constants (tensile strength, cohesive shear strength, and the
//! enlargement factor used when bonds are formed).

use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sim_types::{Result, SimError};

/// Upper bound accepted for the friction coefficient.
pub const MAX_FRICTION_COEFFICIENT: f64 = 10_000.0;

/// Number of ordered textual settings accepted by [`CohesiveParams::from_settings`].
pub const SETTINGS_COUNT: usize = 9;

/// Physical parameters of the cohesive contact model.
///
/// # Force law
///
/// With virtual overlap `D` (overlap minus the gap recorded at bond
/// formation), contact distance `r` and normal relative speed `v_n`:
///
/// ```text
/// F_n / r = kn * D / r - m_eff * gamma_n * v_n / r^2
/// F_t     = -(kt * shear + m_eff * gamma_t * v_t)
/// |F_t|  <= mu * |F_n| + [bonded] * pi * r_min * c
/// ```
///
/// A bond fails in tension once `-D` reaches `pi * r_min * t / kn`.
///
/// # Example
///
/// ```
/// use sim_cohesion::CohesiveParams;
///
/// let params = CohesiveParams::default()
///     .with_normal_stiffness(2.0e5)
///     .with_tensile_strength(50.0);
/// assert!(params.validate().is_ok());
///
/// let parsed = CohesiveParams::from_settings(&[
///     "2e5", "NULL", "50", "NULL", "0.5", "1", "50", "20", "1.2",
/// ])
/// .unwrap();
/// assert_eq!(parsed.tangential_stiffness, 2.0e5 * 2.0 / 7.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CohesiveParams {
    /// Normal spring stiffness `kn` (force per unit overlap).
    pub normal_stiffness: f64,

    /// Tangential spring stiffness `kt`, acting on the shear history.
    pub tangential_stiffness: f64,

    /// Normal velocity damping `gamma_n` (per unit effective mass).
    pub normal_damping: f64,

    /// Tangential velocity damping `gamma_t` (per unit effective mass).
    ///
    /// Ignored when [`damping_enabled`](Self::damping_enabled) is false.
    pub tangential_damping: f64,

    /// Coulomb friction coefficient `mu`.
    pub friction_coefficient: f64,

    /// Whether tangential velocity damping is applied.
    pub damping_enabled: bool,

    /// Tensile strength `t` of a bond (force per unit length).
    pub tensile_strength: f64,

    /// Cohesive shear strength `c` of a bond (force per unit length).
    pub cohesive_shear_strength: f64,

    /// Enlargement factor for the bond-formation search distance.
    ///
    /// Two particles bond at the first step when their distance is at most
    /// `r_i + r_j + (factor - 1) * min(r_i, r_j)`.
    pub enlarge_factor: f64,
}

impl Default for CohesiveParams {
    fn default() -> Self {
        Self {
            normal_stiffness: 200_000.0,
            tangential_stiffness: 200_000.0 * 2.0 / 7.0,
            normal_damping: 50.0,
            tangential_damping: 25.0,
            friction_coefficient: 0.5,
            damping_enabled: true,
            tensile_strength: 100.0,
            cohesive_shear_strength: 100.0,
            enlarge_factor: 1.0,
        }
    }
}

impl CohesiveParams {
    /// Parse the nine ordered settings.
    ///
    /// Order: `kn kt gamma_n gamma_t mu dampflag t c enlarge`. `kt` may be
    /// `NULL` (derived as `2/7 * kn`) and so may `gamma_t` (derived as
    /// `gamma_n / 2`). A damping flag of 0 forces `gamma_t` to zero.
    pub fn from_settings<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        if args.len() != SETTINGS_COUNT {
            return Err(SimError::SettingsCount {
                expected: SETTINGS_COUNT,
                actual: args.len(),
            });
        }
        let arg = |i: usize| args[i].as_ref().trim();

        let normal_stiffness = parse_number("normal_stiffness", arg(0))?;
        let tangential_stiffness = if arg(1) == "NULL" {
            normal_stiffness * 2.0 / 7.0
        } else {
            parse_number("tangential_stiffness", arg(1))?
        };
        let normal_damping = parse_number("normal_damping", arg(2))?;
        let mut tangential_damping = if arg(3) == "NULL" {
            0.5 * normal_damping
        } else {
            parse_number("tangential_damping", arg(3))?
        };
        let friction_coefficient = parse_number("friction_coefficient", arg(4))?;
        let damping_enabled = match arg(5).parse::<i64>() {
            Ok(0) => false,
            Ok(1) => true,
            _ => {
                return Err(SimError::invalid_parameter(
                    "damping_flag",
                    arg(5),
                    "must be 0 or 1",
                ))
            }
        };
        if !damping_enabled {
            tangential_damping = 0.0;
        }

        let params = Self {
            normal_stiffness,
            tangential_stiffness,
            normal_damping,
            tangential_damping,
            friction_coefficient,
            damping_enabled,
            tensile_strength: parse_number("tensile_strength", arg(6))?,
            cohesive_shear_strength: parse_number("cohesive_shear_strength", arg(7))?,
            enlarge_factor: parse_number("enlarge_factor", arg(8))?,
        };
        params.validate()?;
        Ok(params)
    }

    /// Set the normal stiffness.
    #[must_use]
    pub fn with_normal_stiffness(mut self, kn: f64) -> Self {
        self.normal_stiffness = kn;
        self
    }

    /// Set the tangential stiffness.
    #[must_use]
    pub fn with_tangential_stiffness(mut self, kt: f64) -> Self {
        self.tangential_stiffness = kt;
        self
    }

    /// Set normal and tangential damping.
    #[must_use]
    pub fn with_damping(mut self, normal: f64, tangential: f64) -> Self {
        self.normal_damping = normal;
        self.tangential_damping = tangential;
        self
    }

    /// Enable or disable tangential damping.
    #[must_use]
    pub fn with_damping_enabled(mut self, enabled: bool) -> Self {
        self.damping_enabled = enabled;
        self
    }

    /// Set the friction coefficient.
    #[must_use]
    pub fn with_friction(mut self, mu: f64) -> Self {
        self.friction_coefficient = mu;
        self
    }

    /// Set the bond tensile strength.
    #[must_use]
    pub fn with_tensile_strength(mut self, t: f64) -> Self {
        self.tensile_strength = t;
        self
    }

    /// Set the bond cohesive shear strength.
    #[must_use]
    pub fn with_cohesive_shear_strength(mut self, c: f64) -> Self {
        self.cohesive_shear_strength = c;
        self
    }

    /// Set the bond-formation enlargement factor.
    #[must_use]
    pub fn with_enlarge_factor(mut self, factor: f64) -> Self {
        self.enlarge_factor = factor;
        self
    }

    /// Validate the parameters.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("normal_stiffness", self.normal_stiffness),
            ("tangential_stiffness", self.tangential_stiffness),
            ("normal_damping", self.normal_damping),
            ("tangential_damping", self.tangential_damping),
            ("friction_coefficient", self.friction_coefficient),
            ("tensile_strength", self.tensile_strength),
            ("cohesive_shear_strength", self.cohesive_shear_strength),
            ("enlarge_factor", self.enlarge_factor),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() {
                return Err(SimError::invalid_parameter(name, value, "must be finite"));
            }
            if value < 0.0 {
                return Err(SimError::invalid_parameter(
                    name,
                    value,
                    "must be non-negative",
                ));
            }
        }
        if self.friction_coefficient > MAX_FRICTION_COEFFICIENT {
            return Err(SimError::invalid_parameter(
                "friction_coefficient",
                self.friction_coefficient,
                format!("must not exceed {MAX_FRICTION_COEFFICIENT}"),
            ));
        }
        Ok(())
    }

    /// Tangential damping actually applied, zero when damping is disabled.
    #[must_use]
    pub fn effective_tangential_damping(&self) -> f64 {
        if self.damping_enabled {
            self.tangential_damping
        } else {
            0.0
        }
    }

    /// Maximum loss of virtual overlap a bond tolerates before failing in tension.
    ///
    /// A zero normal stiffness has no tensile failure mode, so the limit is infinite.
    #[must_use]
    pub fn tensile_limit(&self, radius_min: f64) -> f64 {
        if self.normal_stiffness > 0.0 {
            PI * radius_min * self.tensile_strength / self.normal_stiffness
        } else {
            f64::INFINITY
        }
    }

    /// Cohesive contribution to the tangential force limit of a bonded pair.
    #[must_use]
    pub fn max_shear_force(&self, radius_min: f64) -> f64 {
        PI * radius_min * self.cohesive_shear_strength
    }

    /// Center distance within which two particles bond at formation time.
    #[must_use]
    pub fn bond_distance(&self, radius_i: f64, radius_j: f64) -> f64 {
        radius_i + radius_j + (self.enlarge_factor - 1.0) * radius_i.min(radius_j)
    }
}

fn parse_number(name: &'static str, text: &str) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| SimError::invalid_parameter(name, text, "not a number"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SETTINGS: [&str; 9] = ["1e5", "3e4", "20", "8", "0.4", "1", "60", "30", "1.1"];

    #[test]
    fn test_default_params_valid() {
        assert!(CohesiveParams::default().validate().is_ok());
    }

    #[test]
    fn test_from_settings_explicit() {
        let p = CohesiveParams::from_settings(&SETTINGS).unwrap();
        assert_eq!(p.normal_stiffness, 1e5);
        assert_eq!(p.tangential_stiffness, 3e4);
        assert_eq!(p.normal_damping, 20.0);
        assert_eq!(p.tangential_damping, 8.0);
        assert_eq!(p.friction_coefficient, 0.4);
        assert!(p.damping_enabled);
        assert_eq!(p.tensile_strength, 60.0);
        assert_eq!(p.cohesive_shear_strength, 30.0);
        assert_eq!(p.enlarge_factor, 1.1);
    }

    #[test]
    fn test_from_settings_null_derivations() {
        let mut args = SETTINGS;
        args[1] = "NULL";
        args[3] = "NULL";
        let p = CohesiveParams::from_settings(&args).unwrap();
        assert_relative_eq!(p.tangential_stiffness, 1e5 * 2.0 / 7.0);
        assert_relative_eq!(p.tangential_damping, 10.0);
    }

    #[test]
    fn test_damping_flag_zero_disables_tangential_damping() {
        let mut args = SETTINGS;
        args[5] = "0";
        let p = CohesiveParams::from_settings(&args).unwrap();
        assert!(!p.damping_enabled);
        assert_eq!(p.tangential_damping, 0.0);
        assert_eq!(p.effective_tangential_damping(), 0.0);
    }

    #[test]
    fn test_from_settings_rejects_bad_input() {
        assert!(matches!(
            CohesiveParams::from_settings(&SETTINGS[..4]),
            Err(SimError::SettingsCount {
                expected: 9,
                actual: 4
            })
        ));

        let mut args = SETTINGS;
        args[5] = "2";
        assert!(CohesiveParams::from_settings(&args).is_err());

        let mut args = SETTINGS;
        args[0] = "-1";
        assert!(CohesiveParams::from_settings(&args).is_err());

        let mut args = SETTINGS;
        args[4] = "20000";
        assert!(CohesiveParams::from_settings(&args).is_err());

        let mut args = SETTINGS;
        args[7] = "abc";
        let err = CohesiveParams::from_settings(&args).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_derived_quantities() {
        let p = CohesiveParams::default()
            .with_normal_stiffness(1000.0)
            .with_tensile_strength(10.0)
            .with_cohesive_shear_strength(4.0)
            .with_enlarge_factor(1.2);

        assert_relative_eq!(p.tensile_limit(0.5), PI * 0.5 * 10.0 / 1000.0);
        assert_relative_eq!(p.max_shear_force(0.5), PI * 2.0);
        assert_relative_eq!(p.bond_distance(1.0, 0.5), 1.6);
    }

    #[test]
    fn test_zero_stiffness_has_no_tensile_failure() {
        let p = CohesiveParams::default().with_normal_stiffness(0.0);
        assert!(p.tensile_limit(1.0).is_infinite());
    }
}
