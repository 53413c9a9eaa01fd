use std::convert::TryFrom;

use serde::Serialize;
use serde_json::Value;

use crate::{BridgeError, Result};

static DEFAULT_QCONFIG_KEY: &str = "default_qconfig";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObserverType {
    PostTrainingStaticQuant,
    PostTrainingDynamicQuant,
    QuantAwareTraining,
}

impl ObserverType {
    pub fn as_str(&self) -> &str {
        use ObserverType::*;
        match self {
            PostTrainingStaticQuant => "post_training_static_quant",
            PostTrainingDynamicQuant => "post_training_dynamic_quant",
            QuantAwareTraining => "quant_aware_training",
        }
    }
}

impl Default for ObserverType {
    fn default() -> Self {
        ObserverType::PostTrainingStaticQuant
    }
}

impl TryFrom<&str> for ObserverType {
    type Error = BridgeError;

    fn try_from(value: &str) -> Result<Self> {
        use ObserverType::*;
        match value {
            "post_training_static_quant" | "ptq_static" => Ok(PostTrainingStaticQuant),
            "post_training_dynamic_quant" | "ptq_dynamic" => Ok(PostTrainingDynamicQuant),
            "quant_aware_training" | "qat" => Ok(QuantAwareTraining),
            other => Err(BridgeError::InvalidObserver(other.to_string())),
        }
    }
}

/// Op configs keyed the way the FX graph quantizer expects them.
///
/// Serializes to `{"": default, "module_name": [[name, qconfig], ...]}`;
/// the `""` entry is left out when there was no default.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FxOpConfigs<V> {
    #[serde(rename = "", skip_serializing_if = "Option::is_none")]
    pub global: Option<V>,
    pub module_name: Vec<(String, V)>,
}

impl<V: Serialize> FxOpConfigs<V> {
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Converts per-op quantization configs into the FX quantizer layout.
///
/// `observer_type` is accepted so callers can pass through what the tuning
/// strategy selected; the layout is the same for every observer today.
pub fn cfgs_to_fx_cfgs<K, V, I>(op_cfgs: I, observer_type: ObserverType) -> FxOpConfigs<V>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    let _ = observer_type;

    let mut global = None;
    let mut module_name = Vec::new();
    for (key, value) in op_cfgs {
        let key = key.into();
        if key == DEFAULT_QCONFIG_KEY {
            global = Some(value);
            continue;
        }
        module_name.push((key, value));
    }

    FxOpConfigs { global, module_name }
}
