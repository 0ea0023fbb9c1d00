//! AMF Configuration
//!
//! The `amf:` section of the YAML configuration file, plus its resolution
//! into the NGAP value types the core works with.

use std::path::Path;
use std::time::Duration;

use ogs_ngap::ie::{
    AllowedNssai, AmfName, AmfSetId, Guami, PlmnId, PlmnSupportItem, PlmnSupportList, SNssai,
    ServedGuamiItem, ServedGuamiList, UeAmbr, UeSecurityCapabilities,
};
use ogs_ngap::{NgapError, NgapResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Default NGAP listen address
pub const DEFAULT_NGAP_ADDR: &str = "0.0.0.0:38412";

/// Top level of the configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub amf: AmfConfig,
}

/// `amf:` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmfConfig {
    pub amf_name: String,
    pub relative_capacity: u8,
    pub guami: Vec<GuamiConf>,
    pub plmn_support: Vec<PlmnSupportConf>,
    pub defaults: UeDefaultsConf,
    pub timers: TimerConf,
    pub workers: usize,
    pub ngap: NgapConf,
}

impl Default for AmfConfig {
    fn default() -> Self {
        AmfConfig {
            amf_name: "nextgcore-amf0".to_string(),
            relative_capacity: 255,
            guami: vec![GuamiConf {
                plmn_id: PlmnConf::default(),
                region: 2,
                set: 1,
                pointer: 0,
            }],
            plmn_support: vec![PlmnSupportConf {
                plmn_id: PlmnConf::default(),
                s_nssai: vec![SNssaiConf { sst: 1, sd: None }],
            }],
            defaults: UeDefaultsConf::default(),
            timers: TimerConf::default(),
            workers: 4,
            ngap: NgapConf::default(),
        }
    }
}

/// PLMN identity as written in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlmnConf {
    pub mcc: u16,
    pub mnc: u16,
    /// Number of MNC digits; inferred from the value when absent
    #[serde(default)]
    pub mnc_len: Option<u8>,
}

impl Default for PlmnConf {
    fn default() -> Self {
        PlmnConf {
            mcc: 999,
            mnc: 70,
            mnc_len: None,
        }
    }
}

impl PlmnConf {
    pub fn to_plmn_id(&self) -> Result<PlmnId, ConfigError> {
        if self.mcc > 999 || self.mnc > 999 {
            return Err(ConfigError::ValidationError(format!(
                "PLMN {}/{} out of range",
                self.mcc, self.mnc
            )));
        }
        let mnc_len = self
            .mnc_len
            .unwrap_or(if self.mnc > 99 { 3 } else { 2 });
        if mnc_len != 2 && mnc_len != 3 {
            return Err(ConfigError::ValidationError(format!(
                "mnc_len must be 2 or 3, got {mnc_len}"
            )));
        }
        Ok(PlmnId::from_mcc_mnc(self.mcc, self.mnc, mnc_len))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuamiConf {
    pub plmn_id: PlmnConf,
    pub region: u8,
    pub set: u16,
    pub pointer: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlmnSupportConf {
    pub plmn_id: PlmnConf,
    pub s_nssai: Vec<SNssaiConf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SNssaiConf {
    pub sst: u8,
    /// Slice differentiator, six hex digits
    #[serde(default)]
    pub sd: Option<String>,
}

impl SNssaiConf {
    pub fn to_s_nssai(&self) -> Result<SNssai, ConfigError> {
        let sd = match &self.sd {
            None => None,
            Some(hex) => {
                let value = u32::from_str_radix(hex.trim_start_matches("0x"), 16)
                    .map_err(|e| ConfigError::ValidationError(format!("bad sd '{hex}': {e}")))?;
                if value > 0xff_ffff {
                    return Err(ConfigError::ValidationError(format!(
                        "sd '{hex}' exceeds 24 bits"
                    )));
                }
                Some(value)
            }
        };
        Ok(SNssai::new(self.sst, sd))
    }
}

/// Values used when a UE context has not been given its own
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UeDefaultsConf {
    pub ue_ambr_dl: u64,
    pub ue_ambr_ul: u64,
    pub ue_security_capabilities: SecurityCapabilitiesConf,
}

impl Default for UeDefaultsConf {
    fn default() -> Self {
        UeDefaultsConf {
            ue_ambr_dl: 1_000_000_000,
            ue_ambr_ul: 1_000_000_000,
            ue_security_capabilities: SecurityCapabilitiesConf::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityCapabilitiesConf {
    pub nr_encryption: u16,
    pub nr_integrity: u16,
    pub eutra_encryption: u16,
    pub eutra_integrity: u16,
}

impl Default for SecurityCapabilitiesConf {
    fn default() -> Self {
        let caps = UeSecurityCapabilities::default();
        SecurityCapabilitiesConf {
            nr_encryption: caps.nr_encryption,
            nr_integrity: caps.nr_integrity,
            eutra_encryption: caps.eutra_encryption,
            eutra_integrity: caps.eutra_integrity,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConf {
    /// Wait for Handover Request Acknowledge / Failure
    pub handover_preparation_ms: u64,
    /// Wait for Handover Notify after Handover Command
    pub handover_completion_ms: u64,
}

impl Default for TimerConf {
    fn default() -> Self {
        TimerConf {
            handover_preparation_ms: 5_000,
            handover_completion_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NgapConf {
    pub addr: String,
}

impl Default for NgapConf {
    fn default() -> Self {
        NgapConf {
            addr: DEFAULT_NGAP_ADDR.to_string(),
        }
    }
}

impl AmfConfig {
    /// Load the `amf:` section from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_yaml::from_str(text)?;
        Ok(file.amf)
    }

    /// Validate and convert into NGAP values
    pub fn resolve(&self) -> Result<AmfProfile, ConfigError> {
        if self.amf_name.is_empty() || self.amf_name.len() > AmfName::MAX_LEN {
            return Err(ConfigError::ValidationError(format!(
                "amf_name must be 1..={} characters",
                AmfName::MAX_LEN
            )));
        }
        if self.guami.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one guami is required".to_string(),
            ));
        }
        if self.plmn_support.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one plmn_support entry is required".to_string(),
            ));
        }

        let mut guamis = Vec::with_capacity(self.guami.len());
        for entry in &self.guami {
            let amf_set_id = AmfSetId::new(entry.set).map_err(|e| {
                ConfigError::ValidationError(format!("guami set {}: {e}", entry.set))
            })?;
            if entry.pointer > 0x3f {
                return Err(ConfigError::ValidationError(format!(
                    "guami pointer {} exceeds 6 bits",
                    entry.pointer
                )));
            }
            guamis.push(Guami {
                plmn_id: entry.plmn_id.to_plmn_id()?,
                amf_region_id: entry.region,
                amf_set_id,
                amf_pointer: entry.pointer,
            });
        }

        let mut plmn_support = Vec::with_capacity(self.plmn_support.len());
        for entry in &self.plmn_support {
            let slices = entry
                .s_nssai
                .iter()
                .map(SNssaiConf::to_s_nssai)
                .collect::<Result<Vec<_>, _>>()?;
            if slices.is_empty() {
                return Err(ConfigError::ValidationError(
                    "plmn_support entry without s_nssai".to_string(),
                ));
            }
            plmn_support.push(PlmnSupportItem {
                plmn_id: entry.plmn_id.to_plmn_id()?,
                slice_support_list: slices,
            });
        }

        let caps = self.defaults.ue_security_capabilities;
        Ok(AmfProfile {
            amf_name: AmfName::from(self.amf_name.as_str()),
            relative_capacity: self.relative_capacity,
            guamis,
            plmn_support: PlmnSupportList(plmn_support),
            default_ue_ambr: UeAmbr {
                dl: self.defaults.ue_ambr_dl,
                ul: self.defaults.ue_ambr_ul,
            },
            default_security_capabilities: UeSecurityCapabilities {
                nr_encryption: caps.nr_encryption,
                nr_integrity: caps.nr_integrity,
                eutra_encryption: caps.eutra_encryption,
                eutra_integrity: caps.eutra_integrity,
            },
            handover_preparation_timeout: Duration::from_millis(
                self.timers.handover_preparation_ms,
            ),
            handover_completion_timeout: Duration::from_millis(self.timers.handover_completion_ms),
        })
    }
}

/// Resolved configuration, in NGAP value types
#[derive(Debug, Clone, PartialEq)]
pub struct AmfProfile {
    pub amf_name: AmfName,
    pub relative_capacity: u8,
    /// Never empty
    pub guamis: Vec<Guami>,
    pub plmn_support: PlmnSupportList,
    pub default_ue_ambr: UeAmbr,
    pub default_security_capabilities: UeSecurityCapabilities,
    pub handover_preparation_timeout: Duration,
    pub handover_completion_timeout: Duration,
}

impl AmfProfile {
    pub fn served_guami_list(&self) -> ServedGuamiList {
        ServedGuamiList(
            self.guamis
                .iter()
                .map(|guami| ServedGuamiItem {
                    guami: *guami,
                    backup_amf_name: None,
                })
                .collect(),
        )
    }

    /// GUAMI stamped on Handover and Initial Context Setup Requests
    pub fn primary_guami(&self) -> NgapResult<Guami> {
        self.guamis.first().copied().ok_or_else(|| NgapError::InvalidIeValue {
            ie_name: "GUAMI",
            reason: "no GUAMI configured".to_string(),
        })
    }

    pub fn serves_plmn(&self, plmn_id: &PlmnId) -> bool {
        self.plmn_support.0.iter().any(|item| item.plmn_id == *plmn_id)
    }

    /// Every configured slice, deduplicated, in configuration order
    pub fn allowed_nssai(&self) -> AllowedNssai {
        let mut slices: Vec<SNssai> = Vec::new();
        for slice in self.plmn_support.0.iter().flat_map(|p| &p.slice_support_list) {
            if !slices.contains(slice) {
                slices.push(*slice);
            }
        }
        slices.truncate(ogs_ngap::ie::MAX_NO_OF_ALLOWED_S_NSSAIS);
        AllowedNssai(slices)
    }
}
