/* ************************************************************************ **
** This file is part of rsp2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of rsp2 is provided under this permissive license, **
** and that the project as a whole is licensed under the GPL 3.0.           **
** ************************************************************************ */

// NOTE: Please make sure to use the YamlRead trait when deserializing these types!
//
//       DO NOT USE serde_yaml::from_{reader,value,etc.} OUTSIDE THIS CRATE
//       or else you defeat the entire reason for YamlRead's existence.

use serde::de;

use std::path::PathBuf;
use crate::option_aliases::{OrDefault, Nullable};

/// Root settings object.
///
/// This is what you should deserialize.
#[derive(Serialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSettings(pub Settings);

/// Raw deserialized form of settings.
///
/// You shouldn't deserialize this type directly; deserialize `ValidatedSettings` instead,
/// so that additional validation and filling of defaults can be performed.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    #[serde(default)]
    pub threading: Threading,

    /// See the type for documentation.
    pub pair_entropy: PairEntropy,
}
derive_yaml_read!{ValidatedSettings}

impl<'de> de::Deserialize<'de> for ValidatedSettings {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let cereal: Settings = de::Deserialize::deserialize(deserializer)?;

        cereal.validate().map_err(de::Error::custom)
    }
}

/// Settings for the pair entropy collective variable.
///
/// # Example:
///
/// ```yaml
/// pair-entropy:
///   neighbor-list: { cutoff: 0.75, stride: 10 }
///   maxr: 0.65
///   nhist: 100
///   sigma: 0.025
///   density: 2.0
/// ```
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PairEntropy {
    /// Indices (0-based) of the atoms in the structure that participate.
    ///
    /// `None` uses every atom.  Indices must be unique.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Nullable<Vec<usize>>,

    /// Use the minimum image convention for distances.
    ///
    /// When `false`, the cell is ignored (aside from computing the density,
    /// if `density` is not given).
    #[serde(default = "_pair_entropy__pbc")]
    pub pbc: bool,

    /// Run the whole computation on every worker without decomposition or reduction.
    #[serde(default)]
    pub serial: bool,

    /// `None` disables the neighbor list, in which case all pairs are scanned every frame.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbor_list: Nullable<NeighborList>,

    /// Upper bound of the integration of g(r).
    pub maxr: f64,

    /// Number of points on the histogram grid, including both `r = 0` and `r = maxr`.
    pub nhist: usize,

    /// Width of the gaussian kernel used to smooth the pair distribution.
    ///
    /// Must be at least as large as the bin size `maxr / (nhist - 1)`.
    pub sigma: f64,

    /// Fixed number density.  If absent, the density is computed from the cell volume
    /// on every frame, and the virial gains a term from the change in density.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Nullable<f64>,

    /// Two-column file of `r g(r)` with exactly `nhist` data rows.
    ///
    /// When given, the entropy becomes a relative entropy with respect to this reference.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_gofr: Nullable<PathBuf>,

    /// Use a running mean of g(r) over all frames so far.
    #[serde(default)]
    pub average_gofr: bool,

    /// Write `gofr.txt` to the output directory.
    #[serde(default)]
    pub output_gofr: bool,

    /// Write `integrand.txt` to the output directory.
    #[serde(default)]
    pub output_integrand: bool,

    /// How often (in steps) to write the diagnostic outputs. Defaults to 1.
    ///
    /// Only meaningful if `output-gofr` or `output-integrand` is set.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_stride: OrDefault<u64>,
}
fn _pair_entropy__pbc() -> bool { true }

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct NeighborList {
    /// Pairs further apart than this at the time of a rebuild are ignored until the next
    /// rebuild.  Must be at least `maxr + 3 * sigma`.
    pub cutoff: f64,

    /// The list is rebuilt on every step that is a multiple of this.
    pub stride: u64,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all="kebab-case")]
pub enum Threading {
    /// Use rayon for the pair scan and derivative propagation.
    Rayon,
    Serial,
}

impl Default for Threading {
    fn default() -> Self { Threading::Serial }
}
