//! Quantizable op discovery over a module tree.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::Result;

lazy_static! {
    static ref UNIFY_OP_TYPE_MAPPING: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("ConvReLU2d", "Conv2d");
        m.insert("ConvReLU3d", "Conv3d");
        m.insert("LinearReLU", "Linear");
        m.insert("ConvBn2d", "Conv2d");
        m.insert("ConvBnReLU2d", "Conv2d");
        m
    };
}

/// Fused module types reported under the name of the op they quantize as.
pub fn default_type_renames() -> HashMap<String, String> {
    UNIFY_OP_TYPE_MAPPING.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Layer families that are never reported as quantizable ops, even when
/// their type is allow-listed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerCategory {
    Sequential,
    DeQuantStub,
    LayerNorm,
    Embedding,
    Other,
}

impl LayerCategory {
    pub fn from_type_name(type_name: &str) -> LayerCategory {
        use LayerCategory::*;
        match type_name {
            "Sequential" => Sequential,
            "DeQuantStub" => DeQuantStub,
            "LayerNorm" => LayerNorm,
            "Embedding" => Embedding,
            _ => Other,
        }
    }

    pub fn is_excluded(&self) -> bool {
        *self != LayerCategory::Other
    }
}

pub trait Module {
    /// Runtime class name, e.g. `Linear`.
    fn type_name(&self) -> &str;

    /// Subclasses of `LayerNorm` or `Embedding` keep their own type name but
    /// must report the parent category here.
    fn category(&self) -> LayerCategory {
        LayerCategory::from_type_name(self.type_name())
    }

    fn named_children(&self) -> Vec<(&str, &dyn Module)>;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModuleNode {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<LayerCategory>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NamedModule>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NamedModule {
    pub name: String,
    #[serde(flatten)]
    pub module: ModuleNode,
}

impl ModuleNode {
    pub fn new(type_name: &str) -> ModuleNode {
        ModuleNode { type_name: String::from(type_name), category: None, children: Vec::new() }
    }

    pub fn with_category(mut self, category: LayerCategory) -> ModuleNode {
        self.category = Some(category);
        self
    }

    pub fn child(mut self, name: &str, module: ModuleNode) -> ModuleNode {
        self.children.push(NamedModule { name: String::from(name), module });
        self
    }

    pub fn from_json(s: &str) -> Result<ModuleNode> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_yaml(s: &str) -> Result<ModuleNode> {
        Ok(serde_yaml::from_str(s)?)
    }
}

impl Module for ModuleNode {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn category(&self) -> LayerCategory {
        self.category.unwrap_or_else(|| LayerCategory::from_type_name(&self.type_name))
    }

    fn named_children(&self) -> Vec<(&str, &dyn Module)> {
        self.children.iter().map(|c| (c.name.as_str(), &c.module as &dyn Module)).collect()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QuantizableOp {
    pub name: String,
    pub op_type: String,
}

impl QuantizableOp {
    pub fn as_tuple(&self) -> (&str, &str) {
        (&self.name, &self.op_type)
    }
}

pub struct QuantizableOpCollector {
    allow_list: HashSet<String>,
    type_renames: HashMap<String, String>,
}

impl QuantizableOpCollector {
    pub fn new<I, S>(allow_list: I) -> QuantizableOpCollector
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QuantizableOpCollector {
            allow_list: allow_list.into_iter().map(Into::into).collect(),
            type_renames: default_type_renames(),
        }
    }

    pub fn type_renames(mut self, type_renames: HashMap<String, String>) -> QuantizableOpCollector {
        self.type_renames = type_renames;
        self
    }

    pub fn collect(&self, model: &dyn Module) -> Vec<QuantizableOp> {
        let mut ops = Vec::new();
        self.collect_into(model, "", &mut ops);
        debug!("Found {} quantizable ops", ops.len());
        ops
    }

    /// Walks the children of `model` depth-first. An allow-listed child is
    /// recorded and its subtree skipped; every other child is descended into.
    pub fn collect_into(&self, model: &dyn Module, prefix: &str, ops: &mut Vec<QuantizableOp>) {
        for (name, child) in model.named_children() {
            let op_name = if prefix.is_empty() { name.to_string() } else { format!("{}.{}", prefix, name) };

            if self.is_quantizable(child) {
                let type_name = child.type_name();
                let op_type = self.type_renames.get(type_name).map(String::as_str).unwrap_or(type_name);
                ops.push(QuantizableOp { name: op_name, op_type: op_type.to_string() });
            } else {
                self.collect_into(child, &op_name, ops);
            }
        }
    }

    fn is_quantizable(&self, module: &dyn Module) -> bool {
        self.allow_list.contains(module.type_name()) && !module.category().is_excluded()
    }
}
