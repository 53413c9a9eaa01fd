use std::collections::HashMap;

use quant_bridge::{LayerCategory, Module, ModuleNode, QuantizableOpCollector};

fn ops(collector: &QuantizableOpCollector, model: &dyn Module) -> Vec<(String, String)> {
    collector.collect(model).into_iter().map(|op| (op.name, op.op_type)).collect()
}

#[test]
fn test_allow_listed_leaf_under_container() {
    let model = ModuleNode::new("BertModel").child(
        "encoder",
        ModuleNode::new("BertEncoder").child(
            "dense",
            ModuleNode::new("Linear").child("inner", ModuleNode::new("Linear")),
        ),
    );
    let collector = QuantizableOpCollector::new(vec!["Linear"]);

    assert_eq!(ops(&collector, &model), vec![("encoder.dense".to_string(), "Linear".to_string())]);
}

#[test]
fn test_excluded_types_are_descended() {
    let model = ModuleNode::new("Net")
        .child("norm", ModuleNode::new("LayerNorm").child("proj", ModuleNode::new("Linear")))
        .child("seq", ModuleNode::new("Sequential").child("0", ModuleNode::new("Conv2d")))
        .child("dequant", ModuleNode::new("DeQuantStub"))
        .child("embed", ModuleNode::new("Embedding"));
    let collector =
        QuantizableOpCollector::new(vec!["LayerNorm", "Sequential", "DeQuantStub", "Embedding", "Linear", "Conv2d"]);

    assert_eq!(
        ops(&collector, &model),
        vec![
            ("norm.proj".to_string(), "Linear".to_string()),
            ("seq.0".to_string(), "Conv2d".to_string()),
        ]
    );
}

#[test]
fn test_subclass_category_override() {
    let model = ModuleNode::new("Net")
        .child("ln", ModuleNode::new("FusedLayerNorm").with_category(LayerCategory::LayerNorm))
        .child("fc", ModuleNode::new("Linear"));
    let collector = QuantizableOpCollector::new(vec!["FusedLayerNorm", "Linear"]);

    assert_eq!(ops(&collector, &model), vec![("fc".to_string(), "Linear".to_string())]);
}

#[test]
fn test_type_renames() {
    let model = ModuleNode::new("Net")
        .child("conv", ModuleNode::new("ConvReLU2d"))
        .child("fc", ModuleNode::new("LinearReLU"))
        .child("custom", ModuleNode::new("MyOp"));
    let collector = QuantizableOpCollector::new(vec!["ConvReLU2d", "LinearReLU", "MyOp"]);

    assert_eq!(
        ops(&collector, &model),
        vec![
            ("conv".to_string(), "Conv2d".to_string()),
            ("fc".to_string(), "Linear".to_string()),
            ("custom".to_string(), "MyOp".to_string()),
        ]
    );

    let mut renames = HashMap::new();
    renames.insert("MyOp".to_string(), "Matmul".to_string());
    let collector = QuantizableOpCollector::new(vec!["MyOp"]).type_renames(renames);
    assert_eq!(ops(&collector, &model), vec![("custom".to_string(), "Matmul".to_string())]);
}

#[test]
fn test_tree_from_yaml() {
    let model = ModuleNode::from_yaml(
        r#"
type: DistilBert
children:
  - name: transformer
    type: Transformer
    children:
      - name: q_lin
        type: Linear
      - name: norm
        type: LayerNorm
"#,
    )
    .unwrap();
    let collector = QuantizableOpCollector::new(vec!["Linear", "LayerNorm"]);

    assert_eq!(ops(&collector, &model), vec![("transformer.q_lin".to_string(), "Linear".to_string())]);
}

#[test]
fn test_malformed_tree_is_rejected() {
    let err = ModuleNode::from_json(r#"{"children": [{"name": "fc"}]}"#).unwrap_err();
    assert!(err.to_string().contains("type"), "{}", err);
}
